use thiserror::Error;

/// Main error type for mindmap configuration operations
#[derive(Debug, Error)]
pub enum MindmapError {
    #[error("Configuration error in '{field}': {reason}")]
    ConfigurationError { field: String, reason: String },

    #[error("Settings have not been loaded yet")]
    NotInitialized,

    #[error("Settings are already loaded; they cannot be replaced")]
    AlreadyInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl MindmapError {
    pub fn configuration<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::ConfigurationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Field name carried by a configuration error, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConfigurationError { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError { .. })
    }
}

/// Result type alias for mindmap configuration operations
pub type Result<T> = std::result::Result<T, MindmapError>;
