//! Layered settings loading
//!
//! Sources are merged lowest precedence first:
//! 1. Built-in defaults
//! 2. Configuration file (TOML, JSON as fallback)
//! 3. Environment variables (`MINDMAP_*`)
//! 4. Explicit overrides (CLI `--set key=value`)
//!
//! Loading is synchronous and never touches the network.

use crate::config::document::{FieldKind, FieldSpec, SettingsDocument, FIELDS};
use crate::config::settings::{ConfigWarning, Settings};
use crate::error::{MindmapError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "MINDMAP_CONFIG";

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Default,
    File,
    Environment,
    Override,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueSource::Default => "default",
            ValueSource::File => "file",
            ValueSource::Environment => "env",
            ValueSource::Override => "override",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    DefaultPath,
    Path(PathBuf),
    Disabled,
}

#[derive(Debug, Clone)]
enum EnvSource {
    Process,
    Vars(HashMap<String, String>),
    Disabled,
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Vars(vars) => vars.get(name).cloned(),
            EnvSource::Disabled => None,
        }
    }
}

/// Merged, unvalidated settings plus the provenance of each key
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub document: SettingsDocument,
    /// Config file that was read, if one existed
    pub config_path: Option<PathBuf>,
    sources: Vec<(&'static str, ValueSource)>,
}

impl ResolvedDocument {
    pub fn source_of(&self, key: &str) -> ValueSource {
        self.sources
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, source)| *source)
            .unwrap_or(ValueSource::Default)
    }
}

/// Outcome of a successful load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub settings: Settings,
    pub warnings: Vec<ConfigWarning>,
    pub config_path: Option<PathBuf>,
}

/// Builder describing which sources to read
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: FileSource,
    env: EnvSource,
    overrides: SettingsDocument,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Default file location plus the process environment
    pub fn new() -> Self {
        Self {
            file: FileSource::DefaultPath,
            env: EnvSource::Process,
            overrides: SettingsDocument::new(),
        }
    }

    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file = FileSource::Path(path.into());
        self
    }

    pub fn without_file(mut self) -> Self {
        self.file = FileSource::Disabled;
        self
    }

    /// Read variables from `vars` instead of the process environment
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvSource::Vars(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env = EnvSource::Disabled;
        self
    }

    /// Highest-precedence values, applied after the environment
    pub fn with_overrides(mut self, overrides: SettingsDocument) -> Self {
        self.overrides.merge(overrides);
        self
    }

    /// The file this loader would read, if any
    pub fn config_path(&self) -> Result<Option<PathBuf>> {
        match &self.file {
            FileSource::DefaultPath => default_config_path(&self.env).map(Some),
            FileSource::Path(path) => Ok(Some(path.clone())),
            FileSource::Disabled => Ok(None),
        }
    }

    /// Merge every source without validating
    pub fn resolve(&self) -> Result<ResolvedDocument> {
        let mut document = SettingsDocument::template();
        let mut sources: Vec<(&'static str, ValueSource)> =
            FIELDS.iter().map(|f| (f.key, ValueSource::Default)).collect();

        let mut record = |layer: &SettingsDocument, source: ValueSource| {
            for field in layer.present_fields() {
                if let Some(entry) = sources.iter_mut().find(|(k, _)| *k == field.key) {
                    entry.1 = source;
                }
            }
        };

        let mut config_path = None;
        if let Some(path) = self.config_path()? {
            if path.exists() {
                debug!(path = %path.display(), "loading configuration file");
                let layer = read_file(&path)?;
                record(&layer, ValueSource::File);
                document.merge(layer);
                config_path = Some(path);
            } else {
                debug!(path = %path.display(), "configuration file not found, using defaults");
            }
        }

        let env_layer = read_env(&self.env)?;
        record(&env_layer, ValueSource::Environment);
        document.merge(env_layer);

        record(&self.overrides, ValueSource::Override);
        document.merge(self.overrides.clone());

        Ok(ResolvedDocument {
            document,
            config_path,
            sources,
        })
    }

    /// Merge every source and validate the result
    pub fn load(&self) -> Result<LoadReport> {
        let resolved = self.resolve()?;
        let (settings, mut warnings) = Settings::from_document(&resolved.document)?;

        for field in FIELDS {
            let configured = settings.secret(field).is_some_and(|s| s.is_configured());
            if configured && resolved.source_of(field.key) == ValueSource::File {
                warnings.push(ConfigWarning::new(
                    field.key,
                    format!("secret is stored in the config file; prefer the {} environment variable", field.env),
                ));
            }
        }

        for warning in &warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        info!(
            backend = %settings.backend_api_endpoint(),
            completion = settings.completion_enabled(),
            video_index = settings.enable_video_index_lookup(),
            "configuration loaded"
        );

        Ok(LoadReport {
            settings,
            warnings,
            config_path: resolved.config_path,
        })
    }
}

/// Resolve the default config path: `MINDMAP_CONFIG` > XDG config dir > platform config dir
pub fn get_config_path() -> Result<PathBuf> {
    default_config_path(&EnvSource::Process)
}

fn default_config_path(env: &EnvSource) -> Result<PathBuf> {
    if let Some(explicit) = env.get(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(explicit));
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        let config_dir = if let Some(xdg_config_home) = env.get("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
            PathBuf::from(xdg_config_home)
        } else {
            let home_dir = env
                .get("HOME")
                .or_else(|| dirs::home_dir().map(|p| p.to_string_lossy().into_owned()))
                .ok_or_else(|| MindmapError::configuration("HOME", "environment variable not set"))?;
            PathBuf::from(home_dir).join(".config")
        };
        Ok(config_dir.join("mindmap").join("config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            MindmapError::configuration("config_dir", "unable to determine config directory")
        })?;
        Ok(config_dir.join("mindmap").join("config.toml"))
    }
}

/// Read and parse one config file
pub fn read_file(path: &Path) -> Result<SettingsDocument> {
    let contents = std::fs::read_to_string(path)?;
    SettingsDocument::parse(&contents).map_err(|e| {
        MindmapError::configuration(path.display().to_string(), format!("failed to parse: {e}"))
    })
}

fn read_env(env: &EnvSource) -> Result<SettingsDocument> {
    let mut layer = SettingsDocument::new();

    for field in FIELDS {
        let (name, value) = match env.get(field.env) {
            Some(value) => (field.env, value),
            // OPENAI_API_KEY / YOUTUBE_API_KEY are honored for secrets only
            None if field.kind == FieldKind::Secret => match env.get(field.legacy) {
                Some(value) => (field.legacy, value),
                None => continue,
            },
            None => continue,
        };
        apply_env(&mut layer, field, name, &value)?;
    }

    Ok(layer)
}

fn apply_env(layer: &mut SettingsDocument, field: &FieldSpec, name: &str, value: &str) -> Result<()> {
    debug!(variable = name, key = field.key, "applying environment override");
    layer
        .apply(field, value)
        .map_err(|reason| MindmapError::configuration(name, reason))
}
