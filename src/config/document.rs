//! The persisted settings layout
//!
//! [`SettingsDocument`] mirrors the on-disk key/value table. Every field is
//! optional so a single layer (file, environment, CLI override) can carry a
//! subset of keys. Validation into [`super::Settings`] happens later.

use crate::config::secret::{SecretValue, MASK, NOT_SET};
use crate::error::{MindmapError, Result};
use serde::{Deserialize, Serialize};

/// Kind of value a settings key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Secret,
    Url,
    Flag,
    Count,
}

/// Static description of one settings key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical camelCase key
    pub key: &'static str,
    /// Prefixed environment variable
    pub env: &'static str,
    /// Key used by the original JavaScript config object
    pub legacy: &'static str,
    pub kind: FieldKind,
}

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "completionApiKey",
        env: "MINDMAP_COMPLETION_API_KEY",
        legacy: "OPENAI_API_KEY",
        kind: FieldKind::Secret,
    },
    FieldSpec {
        key: "completionApiEndpoint",
        env: "MINDMAP_COMPLETION_API_ENDPOINT",
        legacy: "OPENAI_API_ENDPOINT",
        kind: FieldKind::Url,
    },
    FieldSpec {
        key: "videoIndexApiKey",
        env: "MINDMAP_VIDEO_INDEX_API_KEY",
        legacy: "YOUTUBE_API_KEY",
        kind: FieldKind::Secret,
    },
    FieldSpec {
        key: "backendApiEndpoint",
        env: "MINDMAP_BACKEND_API_ENDPOINT",
        legacy: "API_ENDPOINT",
        kind: FieldKind::Url,
    },
    FieldSpec {
        key: "enableFileUpload",
        env: "MINDMAP_ENABLE_FILE_UPLOAD",
        legacy: "ENABLE_FILE_UPLOAD",
        kind: FieldKind::Flag,
    },
    FieldSpec {
        key: "enableVideoIndexLookup",
        env: "MINDMAP_ENABLE_VIDEO_INDEX_LOOKUP",
        legacy: "ENABLE_YOUTUBE",
        kind: FieldKind::Flag,
    },
    FieldSpec {
        key: "enableDirectLinks",
        env: "MINDMAP_ENABLE_DIRECT_LINKS",
        legacy: "ENABLE_DIRECT_LINKS",
        kind: FieldKind::Flag,
    },
    FieldSpec {
        key: "maxMediaDurationSeconds",
        env: "MINDMAP_MAX_MEDIA_DURATION_SECONDS",
        legacy: "MAX_VIDEO_DURATION",
        kind: FieldKind::Count,
    },
    FieldSpec {
        key: "maxFileSizeBytes",
        env: "MINDMAP_MAX_FILE_SIZE_BYTES",
        legacy: "MAX_FILE_SIZE",
        kind: FieldKind::Count,
    },
    FieldSpec {
        key: "defaultOutlineDepth",
        env: "MINDMAP_DEFAULT_OUTLINE_DEPTH",
        legacy: "DEFAULT_MIND_MAP_DEPTH",
        kind: FieldKind::Count,
    },
    FieldSpec {
        key: "maxBranchesPerLevel",
        env: "MINDMAP_MAX_BRANCHES_PER_LEVEL",
        legacy: "MAX_NODES_PER_LEVEL",
        kind: FieldKind::Count,
    },
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Find a key by camelCase, snake_case, kebab-case or legacy name
pub fn lookup_field(name: &str) -> Option<&'static FieldSpec> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    FIELDS
        .iter()
        .find(|f| normalize(f.key) == wanted || normalize(f.legacy) == wanted)
}

/// Canonical key names in table order
pub fn keys() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|f| f.key)
}

/// Parse a boolean the way environment variables and `mmconf set` spell them
pub fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean (true/false), got '{other}'")),
    }
}

pub fn parse_count(value: &str) -> std::result::Result<i64, String> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("expected an integer, got '{}'", value.trim()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(alias = "OPENAI_API_KEY", alias = "completion_api_key", skip_serializing_if = "Option::is_none")]
    pub completion_api_key: Option<SecretValue>,
    #[serde(alias = "OPENAI_API_ENDPOINT", alias = "completion_api_endpoint", skip_serializing_if = "Option::is_none")]
    pub completion_api_endpoint: Option<String>,
    #[serde(alias = "YOUTUBE_API_KEY", alias = "video_index_api_key", skip_serializing_if = "Option::is_none")]
    pub video_index_api_key: Option<SecretValue>,
    #[serde(alias = "API_ENDPOINT", alias = "backend_api_endpoint", skip_serializing_if = "Option::is_none")]
    pub backend_api_endpoint: Option<String>,
    #[serde(alias = "ENABLE_FILE_UPLOAD", alias = "enable_file_upload", skip_serializing_if = "Option::is_none")]
    pub enable_file_upload: Option<bool>,
    #[serde(alias = "ENABLE_YOUTUBE", alias = "enable_video_index_lookup", skip_serializing_if = "Option::is_none")]
    pub enable_video_index_lookup: Option<bool>,
    #[serde(alias = "ENABLE_DIRECT_LINKS", alias = "enable_direct_links", skip_serializing_if = "Option::is_none")]
    pub enable_direct_links: Option<bool>,
    #[serde(alias = "MAX_VIDEO_DURATION", alias = "max_media_duration_seconds", skip_serializing_if = "Option::is_none")]
    pub max_media_duration_seconds: Option<i64>,
    #[serde(alias = "MAX_FILE_SIZE", alias = "max_file_size_bytes", skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<i64>,
    #[serde(alias = "DEFAULT_MIND_MAP_DEPTH", alias = "default_outline_depth", skip_serializing_if = "Option::is_none")]
    pub default_outline_depth: Option<i64>,
    #[serde(alias = "MAX_NODES_PER_LEVEL", alias = "max_branches_per_level", skip_serializing_if = "Option::is_none")]
    pub max_branches_per_level: Option<i64>,
}

impl SettingsDocument {
    /// An empty layer with no keys set
    pub fn new() -> Self {
        Self::default()
    }

    /// The shipped template: every key populated with its default
    pub fn template() -> Self {
        Self {
            completion_api_key: Some(SecretValue::empty()),
            completion_api_endpoint: Some(String::new()),
            video_index_api_key: Some(SecretValue::new("your-youtube-api-key")),
            backend_api_endpoint: Some("https://your-backend-api.com".to_string()),
            enable_file_upload: Some(true),
            enable_video_index_lookup: Some(true),
            enable_direct_links: Some(true),
            max_media_duration_seconds: Some(3600),
            max_file_size_bytes: Some(100 * 1024 * 1024),
            default_outline_depth: Some(3),
            max_branches_per_level: Some(10),
        }
    }

    /// Overlay another layer on top of this one; keys set in `overlay` win
    pub fn merge(&mut self, overlay: SettingsDocument) {
        if let Some(v) = overlay.completion_api_key {
            self.completion_api_key = Some(v);
        }
        if let Some(v) = overlay.completion_api_endpoint {
            self.completion_api_endpoint = Some(v);
        }
        if let Some(v) = overlay.video_index_api_key {
            self.video_index_api_key = Some(v);
        }
        if let Some(v) = overlay.backend_api_endpoint {
            self.backend_api_endpoint = Some(v);
        }
        if let Some(v) = overlay.enable_file_upload {
            self.enable_file_upload = Some(v);
        }
        if let Some(v) = overlay.enable_video_index_lookup {
            self.enable_video_index_lookup = Some(v);
        }
        if let Some(v) = overlay.enable_direct_links {
            self.enable_direct_links = Some(v);
        }
        if let Some(v) = overlay.max_media_duration_seconds {
            self.max_media_duration_seconds = Some(v);
        }
        if let Some(v) = overlay.max_file_size_bytes {
            self.max_file_size_bytes = Some(v);
        }
        if let Some(v) = overlay.default_outline_depth {
            self.default_outline_depth = Some(v);
        }
        if let Some(v) = overlay.max_branches_per_level {
            self.max_branches_per_level = Some(v);
        }
    }

    /// Set a key from its string form. Accepts any spelling [`lookup_field`] accepts.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&'static FieldSpec> {
        let field = lookup_field(key).ok_or_else(|| {
            MindmapError::configuration(
                key,
                format!(
                    "unknown configuration key. Available keys: {}",
                    keys().collect::<Vec<_>>().join(", ")
                ),
            )
        })?;
        self.apply(field, value)
            .map_err(|reason| MindmapError::configuration(field.key, reason))?;
        Ok(field)
    }

    /// Set a known field, returning the reason on a malformed value
    pub(crate) fn apply(&mut self, field: &FieldSpec, value: &str) -> std::result::Result<(), String> {
        match field.key {
            "completionApiKey" => self.completion_api_key = Some(SecretValue::new(value.trim())),
            "completionApiEndpoint" => self.completion_api_endpoint = Some(value.trim().to_string()),
            "videoIndexApiKey" => self.video_index_api_key = Some(SecretValue::new(value.trim())),
            "backendApiEndpoint" => self.backend_api_endpoint = Some(value.trim().to_string()),
            "enableFileUpload" => self.enable_file_upload = Some(parse_flag(value)?),
            "enableVideoIndexLookup" => self.enable_video_index_lookup = Some(parse_flag(value)?),
            "enableDirectLinks" => self.enable_direct_links = Some(parse_flag(value)?),
            "maxMediaDurationSeconds" => self.max_media_duration_seconds = Some(parse_count(value)?),
            "maxFileSizeBytes" => self.max_file_size_bytes = Some(parse_count(value)?),
            "defaultOutlineDepth" => self.default_outline_depth = Some(parse_count(value)?),
            "maxBranchesPerLevel" => self.max_branches_per_level = Some(parse_count(value)?),
            other => return Err(format!("'{other}' is not a settable key")),
        }
        Ok(())
    }

    /// Whether this layer carries a value for `field`
    pub fn is_set(&self, field: &FieldSpec) -> bool {
        match field.key {
            "completionApiKey" => self.completion_api_key.is_some(),
            "completionApiEndpoint" => self.completion_api_endpoint.is_some(),
            "videoIndexApiKey" => self.video_index_api_key.is_some(),
            "backendApiEndpoint" => self.backend_api_endpoint.is_some(),
            "enableFileUpload" => self.enable_file_upload.is_some(),
            "enableVideoIndexLookup" => self.enable_video_index_lookup.is_some(),
            "enableDirectLinks" => self.enable_direct_links.is_some(),
            "maxMediaDurationSeconds" => self.max_media_duration_seconds.is_some(),
            "maxFileSizeBytes" => self.max_file_size_bytes.is_some(),
            "defaultOutlineDepth" => self.default_outline_depth.is_some(),
            "maxBranchesPerLevel" => self.max_branches_per_level.is_some(),
            _ => false,
        }
    }

    /// Keys carried by this layer, in table order
    pub fn present_fields(&self) -> Vec<&'static FieldSpec> {
        FIELDS.iter().filter(|f| self.is_set(f)).collect()
    }

    /// Printable value of a key, with secrets masked
    pub fn display_value(&self, field: &FieldSpec) -> String {
        fn text(value: &Option<String>) -> String {
            match value.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => NOT_SET.to_string(),
            }
        }
        fn shown<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(T::to_string).unwrap_or_else(|| NOT_SET.to_string())
        }

        match field.key {
            "completionApiKey" => shown(&self.completion_api_key),
            "completionApiEndpoint" => text(&self.completion_api_endpoint),
            "videoIndexApiKey" => shown(&self.video_index_api_key),
            "backendApiEndpoint" => text(&self.backend_api_endpoint),
            "enableFileUpload" => shown(&self.enable_file_upload),
            "enableVideoIndexLookup" => shown(&self.enable_video_index_lookup),
            "enableDirectLinks" => shown(&self.enable_direct_links),
            "maxMediaDurationSeconds" => shown(&self.max_media_duration_seconds),
            "maxFileSizeBytes" => shown(&self.max_file_size_bytes),
            "defaultOutlineDepth" => shown(&self.default_outline_depth),
            "maxBranchesPerLevel" => shown(&self.max_branches_per_level),
            _ => NOT_SET.to_string(),
        }
    }

    /// Copy with non-empty secrets replaced by the mask, safe to print or serialize
    pub fn masked(&self) -> Self {
        fn mask(secret: &Option<SecretValue>) -> Option<SecretValue> {
            secret.as_ref().map(|s| {
                if s.is_empty() {
                    SecretValue::empty()
                } else {
                    SecretValue::new(MASK)
                }
            })
        }

        Self {
            completion_api_key: mask(&self.completion_api_key),
            video_index_api_key: mask(&self.video_index_api_key),
            ..self.clone()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse file contents as TOML, falling back to JSON
    pub fn parse(contents: &str) -> Result<Self> {
        match Self::from_toml_str(contents) {
            Ok(doc) => Ok(doc),
            Err(toml_err) => Self::from_json_str(contents).map_err(|json_err| {
                MindmapError::serialization(format!(
                    "not valid TOML ({toml_err}) or JSON ({json_err})"
                ))
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
