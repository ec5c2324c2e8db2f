//! Single-assignment holder for the process settings
//!
//! A [`ConfigProvider`] moves from unloaded to loaded exactly once. The host
//! owns the provider and hands it (or the `Arc<Settings>` it returns) to each
//! collaborator when constructing them; there is no global instance.

use crate::config::document::SettingsDocument;
use crate::config::loader::{LoadReport, SettingsLoader};
use crate::config::settings::Settings;
use crate::error::{MindmapError, Result};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct ConfigProvider {
    settings: OnceLock<Arc<Settings>>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate all sources described by `loader`, then store the result
    pub fn load(&self, loader: &SettingsLoader) -> Result<Arc<Settings>> {
        self.ensure_unloaded()?;
        let LoadReport { settings, .. } = loader.load()?;
        self.install(settings)
    }

    /// Validate an injected document and store it
    pub fn load_document(&self, document: &SettingsDocument) -> Result<Arc<Settings>> {
        self.ensure_unloaded()?;
        let (settings, warnings) = Settings::from_document(document)?;
        for warning in &warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        self.install(settings)
    }

    /// Store settings that were already validated elsewhere
    pub fn load_settings(&self, settings: Settings) -> Result<Arc<Settings>> {
        self.install(settings)
    }

    /// The loaded settings. Never re-reads any source.
    pub fn get(&self) -> Result<Arc<Settings>> {
        self.settings
            .get()
            .cloned()
            .ok_or(MindmapError::NotInitialized)
    }

    pub fn is_loaded(&self) -> bool {
        self.settings.get().is_some()
    }

    fn ensure_unloaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Err(MindmapError::AlreadyInitialized);
        }
        Ok(())
    }

    fn install(&self, settings: Settings) -> Result<Arc<Settings>> {
        let settings = Arc::new(settings);
        self.settings
            .set(Arc::clone(&settings))
            .map_err(|_| MindmapError::AlreadyInitialized)?;
        debug!("settings installed");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret::SecretValue;

    fn document() -> SettingsDocument {
        let mut doc = SettingsDocument::template();
        doc.backend_api_endpoint = Some("https://api.mindmap.example".to_string());
        doc.video_index_api_key = Some(SecretValue::new("AIzaSyTestKey"));
        doc
    }

    #[test]
    fn test_get_before_load() {
        let provider = ConfigProvider::new();
        assert!(!provider.is_loaded());
        assert!(matches!(provider.get(), Err(MindmapError::NotInitialized)));
    }

    #[test]
    fn test_load_then_get_returns_same_instance() {
        let provider = ConfigProvider::new();
        let loaded = provider.load_document(&document()).unwrap();
        let fetched = provider.get().unwrap();
        assert!(Arc::ptr_eq(&loaded, &fetched));
        assert!(provider.is_loaded());
    }

    #[test]
    fn test_second_load_is_rejected() {
        let provider = ConfigProvider::new();
        provider.load_document(&document()).unwrap();

        let mut other = document();
        other.max_branches_per_level = Some(2);
        assert!(matches!(
            provider.load_document(&other),
            Err(MindmapError::AlreadyInitialized)
        ));
        assert_eq!(provider.get().unwrap().max_branches_per_level(), 10);
    }

    #[test]
    fn test_failed_load_leaves_provider_unloaded() {
        let provider = ConfigProvider::new();
        let mut bad = document();
        bad.max_file_size_bytes = Some(0);
        assert!(provider.load_document(&bad).unwrap_err().is_configuration());
        assert!(matches!(provider.get(), Err(MindmapError::NotInitialized)));

        provider.load_document(&document()).unwrap();
        assert!(provider.is_loaded());
    }

    #[test]
    fn test_concurrent_readers() {
        let provider = Arc::new(ConfigProvider::new());
        provider.load_document(&document()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || provider.get().map(|s| s.max_file_size_bytes()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 104_857_600);
        }
    }
}
