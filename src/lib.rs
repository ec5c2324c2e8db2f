//! mindmap-config - settings for the mindmap video summarizer
//!
//! Loads API keys, endpoints, feature flags and processing limits from
//! defaults, a config file, the environment and explicit overrides, validates
//! them once and hands the resulting immutable [`config::Settings`] to the
//! rest of the application.

pub mod cli;
pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigProvider, Settings, SettingsDocument, SettingsLoader};
pub use error::{MindmapError, Result};
