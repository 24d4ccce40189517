//! Core data models for translation

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation direction. The choice set is closed: exactly two language
/// pairs are supported, each backed by its own model checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Arabic → English
    ArabicToEnglish,
    /// English → Arabic
    EnglishToArabic,
}

impl Direction {
    /// All supported directions, in selector order.
    pub fn all() -> [Direction; 2] {
        [Direction::ArabicToEnglish, Direction::EnglishToArabic]
    }

    /// The opposite direction (useful for round-trip checks).
    pub fn reverse(&self) -> Direction {
        match self {
            Direction::ArabicToEnglish => Direction::EnglishToArabic,
            Direction::EnglishToArabic => Direction::ArabicToEnglish,
        }
    }

    /// Human-readable selector label.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::ArabicToEnglish => "Arabic to English",
            Direction::EnglishToArabic => "English to Arabic",
        }
    }

    /// Wire value used in the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ArabicToEnglish => "arabic_to_english",
            Direction::EnglishToArabic => "english_to_arabic",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub direction: Direction,
    pub text: String,
}

impl TranslationRequest {
    pub fn new(direction: Direction, text: impl Into<String>) -> Self {
        Self {
            direction,
            text: text.into(),
        }
    }

    /// Empty or whitespace-only input must never reach the model layer.
    pub fn is_empty_input(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub direction: Direction,
    pub model_dir: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Tokenization options applied when encoding input text.
///
/// Inputs longer than `max_length` tokens are silently truncated rather than
/// rejected; a deliberate policy, kept explicit here instead of relying on
/// tokenizer defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub padding: bool,
    pub truncation: bool,
    pub max_length: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            padding: true,
            truncation: true,
            max_length: 512,
        }
    }
}

/// Decoding policy for generation.
///
/// Greedy decoding with a fixed seed: identical (model, text) pairs always
/// produce identical output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_new_tokens: usize,
    pub seed: u64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            seed: 299792458,
        }
    }
}
