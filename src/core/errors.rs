//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// Model or tokenizer failed to load
    #[error("Initialization error: {path} - {message}")]
    Initialization {
        path: String,
        message: String,
    },

    /// Failure during encode/generate/decode
    #[error("Translation error: {message}")]
    Translation {
        message: String,
    },

    /// Empty or whitespace-only input text
    #[error("Input text is empty. Nothing to translate")]
    EmptyInput,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<anyhow::Error> for TranslatorError {
    fn from(err: anyhow::Error) -> Self {
        TranslatorError::Internal(err.to_string())
    }
}

impl TranslatorError {
    /// Stable error code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            TranslatorError::Initialization { .. } => "initialization_error",
            TranslatorError::Translation { .. } => "translation_error",
            TranslatorError::EmptyInput => "empty_input",
            TranslatorError::Config { .. } => "config_error",
            _ => "internal_error",
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TranslatorError::Initialization {
            path: "models/ar-en".to_string(),
            message: "missing config.json".to_string(),
        };
        assert_eq!(err.code(), "initialization_error");
        assert!(err.to_string().contains("models/ar-en"));

        assert_eq!(TranslatorError::EmptyInput.code(), "empty_input");
    }
}
