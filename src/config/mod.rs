//! Configuration management module
//!
//! This module handles configuration loading, validation, and persistence
//! from multiple sources including command-line overrides, environment
//! variables, configuration files, and default values.

pub mod document;
pub mod loader;
pub mod provider;
pub mod secret;
pub mod settings;

pub use document::{lookup_field, FieldKind, FieldSpec, SettingsDocument, FIELDS};
pub use loader::{get_config_path, LoadReport, ResolvedDocument, SettingsLoader, ValueSource};
pub use provider::ConfigProvider;
pub use secret::SecretValue;
pub use settings::{ConfigWarning, OutlineBounds, Redaction, Settings, UploadLimits};
