//! Tarjama - Local Arabic/English machine translation
//!
//! This library loads pretrained Marian-style sequence-to-sequence
//! checkpoints from local directories and runs CPU inference behind a web
//! form UI and a one-shot CLI.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::TranslatorConfig,
    engine::ModelHandle,
    errors::{Result, TranslatorError},
    models::{Direction, EncodeOptions, GenerationOptions, TranslationRequest, TranslationResult},
    registry::ModelRegistry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
