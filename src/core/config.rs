//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, TranslatorError};
use crate::core::models::{Direction, EncodeOptions, GenerationOptions};

/// Default checkpoint directory for Arabic → English
pub const DEFAULT_AR_EN_MODEL_DIR: &str = "models/ar-en";

/// Default checkpoint directory for English → Arabic
pub const DEFAULT_EN_AR_MODEL_DIR: &str = "models/en-ar";

/// Configuration for the translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub ar_en_model_dir: PathBuf,
    pub en_ar_model_dir: PathBuf,
    pub encode: EncodeOptions,
    pub generation: GenerationOptions,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            ar_en_model_dir: PathBuf::from(DEFAULT_AR_EN_MODEL_DIR),
            en_ar_model_dir: PathBuf::from(DEFAULT_EN_AR_MODEL_DIR),
            encode: EncodeOptions::default(),
            generation: GenerationOptions::default(),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let ar_en_model_dir = std::env::var("AR_EN_MODEL_DIR")
            .unwrap_or_else(|_| DEFAULT_AR_EN_MODEL_DIR.to_string())
            .into();

        let en_ar_model_dir = std::env::var("EN_AR_MODEL_DIR")
            .unwrap_or_else(|_| DEFAULT_EN_AR_MODEL_DIR.to_string())
            .into();

        let max_length = std::env::var("MAX_INPUT_TOKENS")
            .unwrap_or_else(|_| "512".to_string())
            .parse::<usize>()
            .map_err(|e| TranslatorError::Config {
                message: format!("Invalid MAX_INPUT_TOKENS: {}", e),
            })?;

        let max_new_tokens = std::env::var("MAX_NEW_TOKENS")
            .unwrap_or_else(|_| "128".to_string())
            .parse::<usize>()
            .map_err(|e| TranslatorError::Config {
                message: format!("Invalid MAX_NEW_TOKENS: {}", e),
            })?;

        let config = Self {
            ar_en_model_dir,
            en_ar_model_dir,
            encode: EncodeOptions {
                max_length,
                ..EncodeOptions::default()
            },
            generation: GenerationOptions {
                max_new_tokens,
                ..GenerationOptions::default()
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ar_en_model_dir.as_os_str().is_empty() {
            return Err(TranslatorError::Config {
                message: "ar_en_model_dir must not be empty".to_string(),
            });
        }

        if self.en_ar_model_dir.as_os_str().is_empty() {
            return Err(TranslatorError::Config {
                message: "en_ar_model_dir must not be empty".to_string(),
            });
        }

        if self.encode.max_length == 0 {
            return Err(TranslatorError::Config {
                message: "encode.max_length must be greater than 0".to_string(),
            });
        }

        if self.generation.max_new_tokens == 0 {
            return Err(TranslatorError::Config {
                message: "generation.max_new_tokens must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the checkpoint directory for a direction.
    ///
    /// Each direction maps to exactly its own checkpoint; a handle loaded
    /// from one directory is never used for the other direction.
    pub fn model_dir(&self, direction: Direction) -> &Path {
        match direction {
            Direction::ArabicToEnglish => &self.ar_en_model_dir,
            Direction::EnglishToArabic => &self.en_ar_model_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_model_dir_mapping() {
        let config = TranslatorConfig::default();

        assert_eq!(
            config.model_dir(Direction::ArabicToEnglish),
            Path::new(DEFAULT_AR_EN_MODEL_DIR)
        );
        assert_eq!(
            config.model_dir(Direction::EnglishToArabic),
            Path::new(DEFAULT_EN_AR_MODEL_DIR)
        );
        // Never the other one.
        assert_ne!(
            config.model_dir(Direction::ArabicToEnglish),
            config.model_dir(Direction::EnglishToArabic)
        );
    }

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig::default();
        assert!(config.validate().is_ok());

        let mut bad = TranslatorConfig::default();
        bad.generation.max_new_tokens = 0;
        assert!(bad.validate().is_err());

        let mut bad = TranslatorConfig::default();
        bad.ar_en_model_dir = PathBuf::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TranslatorConfig::default();
        config.generation.max_new_tokens = 64;
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.generation.max_new_tokens, 64);
        assert_eq!(loaded.ar_en_model_dir, config.ar_en_model_dir);
    }
}
