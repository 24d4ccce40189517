//! Model loading and generation
//!
//! A [`ModelHandle`] owns the tokenizer and Marian encoder-decoder weights
//! for one translation direction, pinned to CPU. Loading reads the
//! checkpoint's `config.json`, `tokenizer.json` and `model.safetensors`;
//! generation is greedy autoregressive decoding with a KV cache.

use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::marian;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::core::errors::{Result, TranslatorError};
use crate::core::models::{Direction, EncodeOptions, GenerationOptions, TranslationResult};

/// On-disk `config.json` schema for Marian checkpoints.
///
/// Mirrors the fields the model needs from the HuggingFace config layout;
/// anything a converted checkpoint may omit gets the Marian default.
#[derive(Debug, serde::Deserialize)]
struct CheckpointConfig {
    vocab_size: usize,
    decoder_vocab_size: Option<usize>,
    max_position_embeddings: usize,
    encoder_layers: usize,
    encoder_ffn_dim: usize,
    encoder_attention_heads: usize,
    decoder_layers: usize,
    decoder_ffn_dim: usize,
    decoder_attention_heads: usize,
    #[serde(default = "default_true")]
    use_cache: bool,
    #[serde(default = "default_true")]
    is_encoder_decoder: bool,
    #[serde(default = "default_activation")]
    activation_function: String,
    d_model: usize,
    decoder_start_token_id: u32,
    #[serde(default = "default_true")]
    scale_embedding: bool,
    pad_token_id: u32,
    eos_token_id: u32,
    #[serde(default)]
    forced_eos_token_id: u32,
    #[serde(default = "default_true")]
    share_encoder_decoder_embeddings: bool,
}

fn default_true() -> bool {
    true
}

fn default_activation() -> String {
    "swish".to_string()
}

impl CheckpointConfig {
    fn into_marian(self) -> marian::Config {
        let activation_function = match self.activation_function.as_str() {
            "relu" => candle_nn::Activation::Relu,
            "silu" | "swish" => candle_nn::Activation::Silu,
            _ => candle_nn::Activation::Gelu,
        };
        marian::Config {
            vocab_size: self.vocab_size,
            decoder_vocab_size: self.decoder_vocab_size,
            max_position_embeddings: self.max_position_embeddings,
            encoder_layers: self.encoder_layers,
            encoder_ffn_dim: self.encoder_ffn_dim,
            encoder_attention_heads: self.encoder_attention_heads,
            decoder_layers: self.decoder_layers,
            decoder_ffn_dim: self.decoder_ffn_dim,
            decoder_attention_heads: self.decoder_attention_heads,
            use_cache: self.use_cache,
            is_encoder_decoder: self.is_encoder_decoder,
            activation_function,
            d_model: self.d_model,
            decoder_start_token_id: self.decoder_start_token_id,
            scale_embedding: self.scale_embedding,
            pad_token_id: self.pad_token_id,
            eos_token_id: self.eos_token_id,
            forced_eos_token_id: self.forced_eos_token_id,
            share_encoder_decoder_embeddings: self.share_encoder_decoder_embeddings,
        }
    }
}

/// Build an initialization error for a checkpoint path.
fn init_error(path: &Path, message: impl ToString) -> TranslatorError {
    TranslatorError::Initialization {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Build a translation error from any encode/generate/decode failure.
fn translation_error(message: impl ToString) -> TranslatorError {
    TranslatorError::Translation {
        message: message.to_string(),
    }
}

/// A loaded tokenizer + model pair bound to a compute device.
///
/// Built once per direction and cached for the process lifetime; never
/// rebuilt per request. `translate` takes `&mut self` because generation
/// mutates the decoder KV cache, so a shared handle must sit behind a mutex.
#[derive(Debug)]
pub struct ModelHandle {
    direction: Direction,
    model_dir: PathBuf,
    tokenizer: Tokenizer,
    decoder_tokenizer: Tokenizer,
    model: marian::MTModel,
    config: marian::Config,
    device: Device,
    generation: GenerationOptions,
}

impl ModelHandle {
    /// Load a checkpoint directory into a CPU-bound handle.
    ///
    /// Any missing or unreadable piece fails with an initialization error
    /// naming the offending path; no partially constructed handle escapes.
    pub fn load(
        direction: Direction,
        model_dir: &Path,
        encode: EncodeOptions,
        generation: GenerationOptions,
    ) -> Result<Self> {
        let started = Instant::now();
        let device = Device::Cpu;

        let config_path = model_dir.join("config.json");
        let config_str =
            std::fs::read_to_string(&config_path).map_err(|e| init_error(&config_path, e))?;
        let checkpoint: CheckpointConfig =
            serde_json::from_str(&config_str).map_err(|e| init_error(&config_path, e))?;
        let config = checkpoint.into_marian();

        let mut tokenizer = load_tokenizer(&model_dir.join("tokenizer.json"))?;
        if encode.truncation {
            // Inputs beyond max_length are silently shortened, never rejected.
            tokenizer
                .with_truncation(Some(TruncationParams {
                    max_length: encode.max_length,
                    ..Default::default()
                }))
                .map_err(|e| init_error(model_dir, e))?;
        }
        if encode.padding {
            tokenizer.with_padding(Some(PaddingParams::default()));
        }

        // Marian checkpoints may ship a separate target-side tokenizer for
        // decoding; fall back to the shared one when absent.
        let decoder_path = model_dir.join("tokenizer-dec.json");
        let decoder_tokenizer = if decoder_path.is_file() {
            load_tokenizer(&decoder_path)?
        } else {
            tokenizer.clone()
        };

        let weights_path = model_dir.join("model.safetensors");
        let tensors = candle_core::safetensors::load(&weights_path, &device)
            .map_err(|e| init_error(&weights_path, e))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = marian::MTModel::new(&config, vb).map_err(|e| init_error(model_dir, e))?;

        info!(
            "Loaded {} model from {} in {:?}",
            direction,
            model_dir.display(),
            started.elapsed()
        );

        Ok(Self {
            direction,
            model_dir: model_dir.to_path_buf(),
            tokenizer,
            decoder_tokenizer,
            model,
            config,
            device,
            generation,
        })
    }

    /// The direction this handle was built for. Handles are never reused
    /// across directions.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Checkpoint directory this handle was built from.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Translate one piece of text.
    ///
    /// Callers must have rejected empty input already; the guard here only
    /// backstops that precondition. Generation is greedy and bounded by
    /// `max_new_tokens`, so identical inputs yield identical output.
    pub fn translate(&mut self, text: &str) -> Result<TranslationResult> {
        if text.trim().is_empty() {
            return Err(TranslatorError::EmptyInput);
        }

        let started = Instant::now();
        // The handle is reused across requests; start from a clean cache.
        self.model.reset_kv_cache();

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(translation_error)?;
        let mut input_ids = encoding.get_ids().to_vec();
        if input_ids.last() != Some(&self.config.eos_token_id) {
            input_ids.push(self.config.eos_token_id);
        }
        let input_tokens = input_ids.len();

        let input = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(translation_error)?;
        let encoder_xs = self
            .model
            .encoder()
            .forward(&input, 0)
            .map_err(translation_error)?;

        // Temperature None selects argmax sampling; the seed is irrelevant
        // for greedy decoding but fixed anyway.
        let mut logits_processor = LogitsProcessor::new(self.generation.seed, None, None);
        let max_steps = self
            .generation
            .max_new_tokens
            .min(self.config.max_position_embeddings);

        let mut token_ids = vec![self.config.decoder_start_token_id];
        for index in 0..max_steps {
            // After the first step only the newest token is fed; earlier
            // positions live in the KV cache.
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let decoder_input = Tensor::new(&token_ids[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(translation_error)?;

            let logits = self
                .model
                .decode(&decoder_input, &encoder_xs, start_pos)
                .map_err(translation_error)?;
            let logits = logits
                .squeeze(0)
                .and_then(|l| {
                    let last = l.dim(0)? - 1;
                    l.get(last)
                })
                .map_err(translation_error)?;

            let token = logits_processor.sample(&logits).map_err(translation_error)?;
            token_ids.push(token);
            if token == self.config.eos_token_id || token == self.config.forced_eos_token_id {
                break;
            }
        }

        let output_tokens = token_ids.len().saturating_sub(1);
        let translation = self
            .decoder_tokenizer
            .decode(&token_ids, true)
            .map_err(translation_error)?
            .trim()
            .to_string();

        debug!(
            "Generated {} tokens from {} input tokens in {:?}",
            output_tokens,
            input_tokens,
            started.elapsed()
        );

        Ok(TranslationResult {
            translation,
            direction: self.direction,
            model_dir: self.model_dir.display().to_string(),
            input_tokens,
            output_tokens,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Load a `tokenizer.json` file.
fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| init_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-model");

        let err = ModelHandle::load(
            Direction::ArabicToEnglish,
            &missing,
            EncodeOptions::default(),
            GenerationOptions::default(),
        )
        .unwrap_err();

        match err {
            TranslatorError::Initialization { path, .. } => {
                assert!(path.contains("no-such-model"));
            }
            other => panic!("expected initialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_checkpoint_config_parses_hf_layout() {
        // Field subset of a converted opus-mt checkpoint.
        let json = r#"{
            "vocab_size": 62801,
            "max_position_embeddings": 512,
            "encoder_layers": 6,
            "encoder_ffn_dim": 2048,
            "encoder_attention_heads": 8,
            "decoder_layers": 6,
            "decoder_ffn_dim": 2048,
            "decoder_attention_heads": 8,
            "activation_function": "swish",
            "d_model": 512,
            "decoder_start_token_id": 62800,
            "pad_token_id": 62800,
            "eos_token_id": 0
        }"#;

        let checkpoint: CheckpointConfig = serde_json::from_str(json).unwrap();
        let config = checkpoint.into_marian();

        assert_eq!(config.vocab_size, 62801);
        assert_eq!(config.decoder_start_token_id, 62800);
        assert_eq!(config.forced_eos_token_id, 0);
        assert!(config.use_cache);
        assert!(config.share_encoder_decoder_embeddings);
    }

    #[test]
    fn test_load_corrupt_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "not json").unwrap();

        let err = ModelHandle::load(
            Direction::EnglishToArabic,
            dir.path(),
            EncodeOptions::default(),
            GenerationOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, TranslatorError::Initialization { .. }));
    }
}
