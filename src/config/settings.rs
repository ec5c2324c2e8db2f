//! Validated, immutable application settings
//!
//! [`Settings`] is built from a merged [`SettingsDocument`] exactly once.
//! Fields are private; collaborators read them through accessors and the
//! typed views ([`UploadLimits`], [`OutlineBounds`]).

use crate::config::document::{FieldSpec, SettingsDocument};
use crate::config::secret::SecretValue;
use crate::error::{MindmapError, Result};
use crate::utils::placeholder::is_placeholder_host;
use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;
use url::Url;

const DEFAULT_MAX_MEDIA_DURATION_SECONDS: u64 = 3600;
const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
const DEFAULT_OUTLINE_DEPTH: u32 = 3;
const DEFAULT_MAX_BRANCHES_PER_LEVEL: u32 = 10;

/// Non-fatal finding produced while validating settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Upper bounds the upload handler enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size_bytes: NonZeroU64,
    pub max_media_duration: Duration,
}

/// Generation bounds for the outline/mind-map builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineBounds {
    pub default_depth: NonZeroU32,
    pub max_branches_per_level: NonZeroU32,
}

/// Whether secrets are exposed when converting back to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    Masked,
    Exposed,
}

/// An endpoint as configured, plus its parsed form.
/// `raw` is kept verbatim (trimmed) so the configured text round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    raw: String,
    url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    completion_api_key: SecretValue,
    completion_api_endpoint: Option<Endpoint>,
    video_index_api_key: SecretValue,
    backend_api_endpoint: Endpoint,
    enable_file_upload: bool,
    enable_video_index_lookup: bool,
    enable_direct_links: bool,
    max_media_duration_seconds: NonZeroU64,
    max_file_size_bytes: NonZeroU64,
    default_outline_depth: NonZeroU32,
    max_branches_per_level: NonZeroU32,
}

impl Settings {
    /// Validate a merged document. Checks run in table order and fail on the first invalid key.
    pub fn from_document(doc: &SettingsDocument) -> Result<(Self, Vec<ConfigWarning>)> {
        let mut warnings = Vec::new();

        let enable_file_upload = doc.enable_file_upload.unwrap_or(true);
        let enable_video_index_lookup = doc.enable_video_index_lookup.unwrap_or(true);
        let enable_direct_links = doc.enable_direct_links.unwrap_or(true);

        let completion_api_key = doc.completion_api_key.clone().unwrap_or_default();
        let completion_api_endpoint =
            optional_endpoint("completionApiEndpoint", doc.completion_api_endpoint.as_deref())?;
        if completion_api_key.is_configured() && completion_api_endpoint.is_none() {
            return Err(MindmapError::configuration(
                "completionApiEndpoint",
                "an endpoint URL is required when completionApiKey is configured",
            ));
        }

        let video_index_api_key = doc.video_index_api_key.clone().unwrap_or_default();
        if enable_video_index_lookup && !video_index_api_key.is_configured() {
            return Err(MindmapError::configuration(
                "videoIndexApiKey",
                "video index lookup is enabled but no API key is configured \
                 (set the key or disable enableVideoIndexLookup)",
            ));
        }
        if !enable_video_index_lookup && video_index_api_key.is_configured() {
            warnings.push(ConfigWarning::new(
                "videoIndexApiKey",
                "key is set but enableVideoIndexLookup is off",
            ));
        }

        let backend_api_endpoint = backend_endpoint(doc.backend_api_endpoint.as_deref())?;

        let max_media_duration_seconds = positive_u64(
            "maxMediaDurationSeconds",
            doc.max_media_duration_seconds,
            DEFAULT_MAX_MEDIA_DURATION_SECONDS,
        )?;
        let max_file_size_bytes =
            positive_u64("maxFileSizeBytes", doc.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES)?;
        let default_outline_depth =
            positive_u32("defaultOutlineDepth", doc.default_outline_depth, DEFAULT_OUTLINE_DEPTH)?;
        let max_branches_per_level = positive_u32(
            "maxBranchesPerLevel",
            doc.max_branches_per_level,
            DEFAULT_MAX_BRANCHES_PER_LEVEL,
        )?;

        let settings = Self {
            completion_api_key,
            completion_api_endpoint,
            video_index_api_key,
            backend_api_endpoint,
            enable_file_upload,
            enable_video_index_lookup,
            enable_direct_links,
            max_media_duration_seconds,
            max_file_size_bytes,
            default_outline_depth,
            max_branches_per_level,
        };

        Ok((settings, warnings))
    }

    /// Check a single key of `doc` with the same rules [`Settings::from_document`] applies.
    ///
    /// Rules that span keys (credential required by a feature flag) are left
    /// to full validation, since the other key may come from another layer.
    pub fn validate_field(doc: &SettingsDocument, field: &FieldSpec) -> Result<()> {
        match field.key {
            "completionApiEndpoint" => {
                optional_endpoint(field.key, doc.completion_api_endpoint.as_deref()).map(drop)
            }
            "backendApiEndpoint" => backend_endpoint(doc.backend_api_endpoint.as_deref()).map(drop),
            "maxMediaDurationSeconds" => positive_u64(
                field.key,
                doc.max_media_duration_seconds,
                DEFAULT_MAX_MEDIA_DURATION_SECONDS,
            )
            .map(drop),
            "maxFileSizeBytes" => {
                positive_u64(field.key, doc.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES).map(drop)
            }
            "defaultOutlineDepth" => {
                positive_u32(field.key, doc.default_outline_depth, DEFAULT_OUTLINE_DEPTH).map(drop)
            }
            "maxBranchesPerLevel" => positive_u32(
                field.key,
                doc.max_branches_per_level,
                DEFAULT_MAX_BRANCHES_PER_LEVEL,
            )
            .map(drop),
            _ => Ok(()),
        }
    }

    /// Convert back into the persisted layout
    pub fn to_document(&self, redaction: Redaction) -> SettingsDocument {
        let doc = SettingsDocument {
            completion_api_key: Some(self.completion_api_key.clone()),
            completion_api_endpoint: Some(
                self.completion_api_endpoint
                    .as_ref()
                    .map(|e| e.raw.clone())
                    .unwrap_or_default(),
            ),
            video_index_api_key: Some(self.video_index_api_key.clone()),
            backend_api_endpoint: Some(self.backend_api_endpoint.raw.clone()),
            enable_file_upload: Some(self.enable_file_upload),
            enable_video_index_lookup: Some(self.enable_video_index_lookup),
            enable_direct_links: Some(self.enable_direct_links),
            max_media_duration_seconds: Some(to_i64(self.max_media_duration_seconds.get())),
            max_file_size_bytes: Some(to_i64(self.max_file_size_bytes.get())),
            default_outline_depth: Some(i64::from(self.default_outline_depth.get())),
            max_branches_per_level: Some(i64::from(self.max_branches_per_level.get())),
        };

        match redaction {
            Redaction::Exposed => doc,
            Redaction::Masked => doc.masked(),
        }
    }

    /// The secret stored under a secret key, `None` for any other key
    pub fn secret(&self, field: &FieldSpec) -> Option<&SecretValue> {
        match field.key {
            "completionApiKey" => Some(&self.completion_api_key),
            "videoIndexApiKey" => Some(&self.video_index_api_key),
            _ => None,
        }
    }

    pub fn completion_api_key(&self) -> &SecretValue {
        &self.completion_api_key
    }

    pub fn completion_api_endpoint(&self) -> Option<&Url> {
        self.completion_api_endpoint.as_ref().map(|e| &e.url)
    }

    /// The completion endpoint exactly as configured
    pub fn completion_api_endpoint_str(&self) -> Option<&str> {
        self.completion_api_endpoint.as_ref().map(|e| e.raw.as_str())
    }

    /// Completion features are on when a real key is configured
    pub fn completion_enabled(&self) -> bool {
        self.completion_api_key.is_configured()
    }

    pub fn video_index_api_key(&self) -> &SecretValue {
        &self.video_index_api_key
    }

    pub fn backend_api_endpoint(&self) -> &Url {
        &self.backend_api_endpoint.url
    }

    /// The backend endpoint exactly as configured
    pub fn backend_api_endpoint_str(&self) -> &str {
        &self.backend_api_endpoint.raw
    }

    pub fn enable_file_upload(&self) -> bool {
        self.enable_file_upload
    }

    pub fn enable_video_index_lookup(&self) -> bool {
        self.enable_video_index_lookup
    }

    pub fn enable_direct_links(&self) -> bool {
        self.enable_direct_links
    }

    pub fn max_media_duration_seconds(&self) -> u64 {
        self.max_media_duration_seconds.get()
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes.get()
    }

    pub fn default_outline_depth(&self) -> u32 {
        self.default_outline_depth.get()
    }

    pub fn max_branches_per_level(&self) -> u32 {
        self.max_branches_per_level.get()
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size_bytes: self.max_file_size_bytes,
            max_media_duration: Duration::from_secs(self.max_media_duration_seconds.get()),
        }
    }

    pub fn outline_bounds(&self) -> OutlineBounds {
        OutlineBounds {
            default_depth: self.default_outline_depth,
            max_branches_per_level: self.max_branches_per_level,
        }
    }
}

fn backend_endpoint(raw: Option<&str>) -> Result<Endpoint> {
    const FIELD: &str = "backendApiEndpoint";

    let endpoint = optional_endpoint(FIELD, raw)?.ok_or_else(|| {
        MindmapError::configuration(FIELD, "a backend API endpoint URL is required")
    })?;
    if endpoint.url.host_str().is_some_and(is_placeholder_host) {
        return Err(MindmapError::configuration(
            FIELD,
            format!("'{}' is the template placeholder; configure the real backend URL", endpoint.raw),
        ));
    }
    Ok(endpoint)
}

fn optional_endpoint(field: &str, raw: Option<&str>) -> Result<Option<Endpoint>> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(Some(Endpoint {
            raw: raw.to_string(),
            url: parse_endpoint(field, raw)?,
        })),
        _ => Ok(None),
    }
}

fn parse_endpoint(field: &str, raw: &str) -> Result<Url> {
    // The raw value is echoed back: endpoints are not secrets.
    let url = Url::parse(raw).map_err(|e| {
        MindmapError::configuration(field, format!("'{raw}' is not a valid absolute URL ({e})"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(MindmapError::configuration(
            field,
            format!("'{raw}' must use http or https, not '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(MindmapError::configuration(field, format!("'{raw}' has no host")));
    }

    Ok(url)
}

fn positive_u64(field: &str, value: Option<i64>, default: u64) -> Result<NonZeroU64> {
    let value = match value {
        Some(v) if v > 0 => v as u64,
        Some(v) => {
            return Err(MindmapError::configuration(
                field,
                format!("must be a positive integer, got {v}"),
            ))
        }
        None => default,
    };
    NonZeroU64::new(value)
        .ok_or_else(|| MindmapError::configuration(field, "must be a positive integer"))
}

fn positive_u32(field: &str, value: Option<i64>, default: u32) -> Result<NonZeroU32> {
    let value = match value {
        Some(v) if v > 0 => u32::try_from(v).map_err(|_| {
            MindmapError::configuration(field, format!("{v} exceeds the maximum of {}", u32::MAX))
        })?,
        Some(v) => {
            return Err(MindmapError::configuration(
                field,
                format!("must be a positive integer, got {v}"),
            ))
        }
        None => default,
    };
    NonZeroU32::new(value)
        .ok_or_else(|| MindmapError::configuration(field, "must be a positive integer"))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
