//! Settings loading tests
//!
//! End-to-end checks of the provider contract: load from layered sources,
//! validation failures, and access before loading.

use mindmap_config::config::{ConfigProvider, Redaction, SecretValue, SettingsDocument, SettingsLoader};
use mindmap_config::MindmapError;
use std::io::Write;

fn loader() -> SettingsLoader {
    SettingsLoader::new().without_file().without_env()
}

/// The second committed snapshot, with the real credential replaced
fn openrouter_document() -> SettingsDocument {
    let mut doc = SettingsDocument::template();
    doc.completion_api_key = Some(SecretValue::new("sk-or-v1-0000000000000000"));
    doc.completion_api_endpoint = Some("https://openrouter.ai/api/v1".to_string());
    doc.video_index_api_key = Some(SecretValue::new("AIzaSyTestOnlyKey"));
    doc.backend_api_endpoint = Some("https://backend.mindmap.example".to_string());
    doc
}

#[cfg(test)]
mod provider_contract_tests {
    use super::*;

    #[test]
    fn test_load_then_get_round_trips_every_field() {
        let provider = ConfigProvider::new();
        let input = openrouter_document();
        provider
            .load(&loader().with_overrides(input.clone()))
            .unwrap();

        let settings = provider.get().unwrap();
        let output = settings.to_document(Redaction::Exposed);

        assert_eq!(output.completion_api_key, input.completion_api_key);
        assert_eq!(output.completion_api_endpoint, input.completion_api_endpoint);
        assert_eq!(output.video_index_api_key, input.video_index_api_key);
        assert_eq!(output.backend_api_endpoint, input.backend_api_endpoint);
        assert_eq!(output.enable_file_upload, input.enable_file_upload);
        assert_eq!(output.enable_video_index_lookup, input.enable_video_index_lookup);
        assert_eq!(output.enable_direct_links, input.enable_direct_links);
        assert_eq!(output.max_media_duration_seconds, input.max_media_duration_seconds);
        assert_eq!(output.max_file_size_bytes, input.max_file_size_bytes);
        assert_eq!(output.default_outline_depth, input.default_outline_depth);
        assert_eq!(output.max_branches_per_level, input.max_branches_per_level);
    }

    #[test]
    fn test_openrouter_snapshot_loads() {
        let provider = ConfigProvider::new();
        provider.load_document(&openrouter_document()).unwrap();

        let settings = provider.get().unwrap();
        assert_eq!(settings.max_file_size_bytes(), 104_857_600);
        assert_eq!(
            settings.completion_api_endpoint().map(|u| u.as_str()),
            Some("https://openrouter.ai/api/v1")
        );
        assert!(settings.completion_enabled());
    }

    #[test]
    fn test_get_before_load_is_not_initialized() {
        let provider = ConfigProvider::new();
        assert!(matches!(provider.get(), Err(MindmapError::NotInitialized)));
    }

    #[test]
    fn test_missing_backend_endpoint_fails() {
        let mut doc = openrouter_document();
        doc.backend_api_endpoint = Some(String::new());
        let err = ConfigProvider::new().load_document(&doc).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.field(), Some("backendApiEndpoint"));
    }

    #[test]
    fn test_omitted_backend_endpoint_fails_through_loader() {
        let provider = ConfigProvider::new();
        let err = provider
            .load(
                &SettingsLoader::new()
                    .without_file()
                    .with_env_vars([("MINDMAP_VIDEO_INDEX_API_KEY", "AIzaSyRealKey")]),
            )
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.field(), Some("backendApiEndpoint"));
        assert!(matches!(provider.get(), Err(MindmapError::NotInitialized)));
    }

    #[test]
    fn test_endpoint_text_round_trips_unchanged() {
        let provider = ConfigProvider::new();
        let mut input = openrouter_document();
        input.backend_api_endpoint = Some("https://API.Mindmap.example:443".to_string());
        provider.load(&loader().with_overrides(input.clone())).unwrap();

        let settings = provider.get().unwrap();
        assert_eq!(settings.backend_api_endpoint_str(), "https://API.Mindmap.example:443");
        let output = settings.to_document(Redaction::Exposed);
        assert_eq!(output.backend_api_endpoint, input.backend_api_endpoint);
        assert_eq!(output.completion_api_endpoint, input.completion_api_endpoint);
    }

    #[test]
    fn test_non_positive_file_size_fails() {
        for size in ["0", "-5"] {
            let mut doc = openrouter_document();
            doc.max_file_size_bytes = None;
            let err = ConfigProvider::new()
                .load(
                    &loader()
                        .with_overrides(doc)
                        .with_env_vars([("MINDMAP_MAX_FILE_SIZE_BYTES", size)]),
                )
                .unwrap_err();
            assert_eq!(err.field(), Some("maxFileSizeBytes"));
        }
    }

    #[test]
    fn test_video_lookup_without_key_fails() {
        let mut doc = openrouter_document();
        doc.video_index_api_key = Some(SecretValue::empty());
        let err = ConfigProvider::new().load_document(&doc).unwrap_err();
        assert_eq!(err.field(), Some("videoIndexApiKey"));
    }

    #[test]
    fn test_errors_never_contain_secrets() {
        let mut doc = openrouter_document();
        doc.completion_api_endpoint = None;
        let err = ConfigProvider::new().load_document(&doc).unwrap_err();
        assert!(!err.to_string().contains("sk-or-v1"));
        assert!(!format!("{err:?}").contains("sk-or-v1"));
    }
}

#[cfg(test)]
mod file_source_tests {
    use super::*;

    #[test]
    fn test_legacy_json_config_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "OPENAI_API_KEY": "",
                "OPENAI_API_ENDPOINT": "",
                "YOUTUBE_API_KEY": "your-youtube-api-key",
                "API_ENDPOINT": "https://backend.mindmap.example",
                "ENABLE_FILE_UPLOAD": true,
                "ENABLE_YOUTUBE": false,
                "ENABLE_DIRECT_LINKS": true,
                "MAX_VIDEO_DURATION": 1800,
                "MAX_FILE_SIZE": 52428800,
                "DEFAULT_MIND_MAP_DEPTH": 2,
                "MAX_NODES_PER_LEVEL": 8
            }}"#
        )
        .unwrap();

        let report = SettingsLoader::new()
            .with_file(file.path())
            .without_env()
            .load()
            .unwrap();

        let settings = report.settings;
        assert!(!settings.enable_video_index_lookup());
        assert_eq!(settings.max_media_duration_seconds(), 1800);
        assert_eq!(settings.max_file_size_bytes(), 52_428_800);
        assert_eq!(settings.default_outline_depth(), 2);
        assert_eq!(settings.max_branches_per_level(), 8);
        assert!(!settings.completion_enabled());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backendApiEndpoint = \"https://file.mindmap.example\"\nenableVideoIndexLookup = false"
        )
        .unwrap();

        let report = SettingsLoader::new()
            .with_file(file.path())
            .with_env_vars([("MINDMAP_BACKEND_API_ENDPOINT", "https://env.mindmap.example")])
            .load()
            .unwrap();

        assert_eq!(
            report.settings.backend_api_endpoint().host_str(),
            Some("env.mindmap.example")
        );
        assert_eq!(report.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_template_file_requires_real_video_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SettingsDocument::template().to_toml_string().unwrap()).unwrap();

        let err = SettingsLoader::new()
            .with_file(file.path())
            .without_env()
            .load()
            .unwrap_err();
        assert_eq!(err.field(), Some("videoIndexApiKey"));

        let err = SettingsLoader::new()
            .with_file(file.path())
            .with_env_vars([("YOUTUBE_API_KEY", "AIzaSyFromEnv")])
            .load()
            .unwrap_err();
        assert_eq!(err.field(), Some("backendApiEndpoint"));

        let report = SettingsLoader::new()
            .with_file(file.path())
            .with_env_vars([
                ("YOUTUBE_API_KEY", "AIzaSyFromEnv"),
                ("MINDMAP_BACKEND_API_ENDPOINT", "https://backend.mindmap.example"),
            ])
            .load()
            .unwrap();
        assert!(report.warnings.is_empty());
    }
}
