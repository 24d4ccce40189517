//! Process-wide model cache keyed by direction
//!
//! Handles are created on first use per direction and retained for the
//! process lifetime (load-once-read-many). The async map lock guarantees
//! at most one load per direction even under concurrent first requests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::engine::ModelHandle;
use crate::core::errors::{Result, TranslatorError};
use crate::core::models::{Direction, TranslationRequest, TranslationResult};

/// Lazy per-direction cache of loaded model handles.
pub struct ModelRegistry {
    config: Arc<TranslatorConfig>,
    handles: AsyncMutex<HashMap<Direction, Arc<parking_lot::Mutex<ModelHandle>>>>,
}

impl ModelRegistry {
    /// Create an empty registry; nothing is loaded until first use.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            handles: AsyncMutex::new(HashMap::new()),
        })
    }

    /// Create from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(TranslatorConfig::from_env()?)
    }

    /// Registry configuration.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Directions with an already-loaded handle.
    pub async fn loaded_directions(&self) -> Vec<Direction> {
        let handles = self.handles.lock().await;
        Direction::all()
            .into_iter()
            .filter(|d| handles.contains_key(d))
            .collect()
    }

    /// Get the cached handle for a direction, loading it on first use.
    ///
    /// Loading runs on the blocking pool; it reads checkpoint files and
    /// builds weights, all CPU-bound work.
    pub async fn get_or_load(
        &self,
        direction: Direction,
    ) -> Result<Arc<parking_lot::Mutex<ModelHandle>>> {
        let mut handles = self.handles.lock().await;
        if let Some(handle) = handles.get(&direction) {
            return Ok(handle.clone());
        }

        info!("Loading model for direction: {}", direction);
        let model_dir = self.config.model_dir(direction).to_path_buf();
        let encode = self.config.encode;
        let generation = self.config.generation;

        let handle = tokio::task::spawn_blocking(move || {
            ModelHandle::load(direction, &model_dir, encode, generation)
        })
        .await
        .map_err(|e| TranslatorError::Internal(e.to_string()))??;

        let handle = Arc::new(parking_lot::Mutex::new(handle));
        handles.insert(direction, handle.clone());
        Ok(handle)
    }

    /// Translate a request end to end.
    ///
    /// Empty input is rejected before any handle is resolved or loaded, so
    /// a blank submission never costs a model load.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        if request.is_empty_input() {
            return Err(TranslatorError::EmptyInput);
        }

        let handle = self.get_or_load(request.direction).await?;
        let text = request.text.clone();

        let result =
            tokio::task::spawn_blocking(move || handle.lock().translate(&text))
                .await
                .map_err(|e| TranslatorError::Internal(e.to_string()))?;

        if let Err(ref e) = result {
            warn!("Translation failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{EncodeOptions, GenerationOptions};
    use std::path::PathBuf;

    fn registry_with_missing_models() -> ModelRegistry {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslatorConfig {
            ar_en_model_dir: dir.path().join("ar-en"),
            en_ar_model_dir: dir.path().join("en-ar"),
            encode: EncodeOptions::default(),
            generation: GenerationOptions::default(),
        };
        ModelRegistry::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_load() {
        let registry = registry_with_missing_models();
        let request = TranslationRequest::new(Direction::ArabicToEnglish, "   ");

        // The model directories do not exist, so any load attempt would
        // fail with an initialization error instead of EmptyInput.
        let err = registry.translate(&request).await.unwrap_err();
        assert!(matches!(err, TranslatorError::EmptyInput));
        assert!(registry.loaded_directions().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_model_dir_surfaces_initialization_error() {
        let registry = registry_with_missing_models();
        let request = TranslationRequest::new(Direction::EnglishToArabic, "hello");

        let err = registry.translate(&request).await.unwrap_err();
        match err {
            TranslatorError::Initialization { path, .. } => {
                assert!(path.contains("en-ar"));
            }
            other => panic!("expected initialization error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let registry = registry_with_missing_models();

        let _ = registry.get_or_load(Direction::ArabicToEnglish).await;
        assert!(registry.loaded_directions().await.is_empty());
    }

    #[test]
    fn test_registry_rejects_invalid_config() {
        let config = TranslatorConfig {
            ar_en_model_dir: PathBuf::new(),
            en_ar_model_dir: PathBuf::from("models/en-ar"),
            encode: EncodeOptions::default(),
            generation: GenerationOptions::default(),
        };
        assert!(ModelRegistry::new(config).is_err());
    }
}
