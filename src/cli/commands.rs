//! CLI command definitions and handlers

use clap::Subcommand;
use std::io::Read;

use crate::core::models::Direction;

/// Commands for the translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a sentence from the command line
    Translate {
        /// Text to translate (reads stdin when omitted)
        text: Option<String>,

        /// Translation direction
        #[arg(short, long, value_enum)]
        direction: Direction,

        /// Maximum number of generated tokens
        #[arg(long)]
        max_new_tokens: Option<usize>,
    },

    /// Start the web UI server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Enable debug mode
        #[arg(long)]
        debug: bool,
    },
}

/// Handle one-shot translation command
pub async fn handle_translate(
    text: Option<String>,
    direction: Direction,
    max_new_tokens: Option<usize>,
) -> anyhow::Result<()> {
    use crate::core::models::TranslationRequest;
    use crate::core::registry::ModelRegistry;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;
    use tracing::info;

    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if text.trim().is_empty() {
        // Warn and exit without touching the model.
        eprintln!("⚠️  Please enter a sentence.");
        anyhow::bail!("empty input");
    }

    let mut config = crate::core::config::TranslatorConfig::from_env()?;
    if let Some(max_new_tokens) = max_new_tokens {
        config.generation.max_new_tokens = max_new_tokens;
    }

    info!("Translation direction: {}", direction);
    info!("Model directory: {}", config.model_dir(direction).display());

    let registry = ModelRegistry::new(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Translating...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let request = TranslationRequest::new(direction, text);
    let result = registry.translate(&request).await;
    pb.finish_and_clear();

    match result {
        Ok(result) => {
            println!("{}", result.translation);
            info!(
                "Translated {} -> {} tokens in {}ms",
                result.input_tokens, result.output_tokens, result.duration_ms
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            Err(e.into())
        }
    }
}

/// Handle server command
pub async fn handle_server(host: String, port: u16, debug: bool) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    if debug {
        std::env::set_var("RUST_LOG", "debug");
    }

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("📝 Translation UI: http://{}:{}/", host, port);

    run_server(host, port).await?;

    Ok(())
}
