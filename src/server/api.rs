//! HTTP server: web form UI and JSON translation API

use axum::{
    extract::{Json, State},
    response::Html,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::models::{Direction, TranslationRequest};
use crate::core::registry::ModelRegistry;

/// The rendered form: direction selector, text area, submit button, result
/// area plus warning and error banners.
const INDEX_HTML: &str = include_str!("index.html");

/// Application state
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    loaded_directions: Vec<String>,
}

/// Directions list response
#[derive(Serialize)]
struct DirectionsResponse {
    directions: Vec<DirectionInfo>,
}

#[derive(Serialize)]
struct DirectionInfo {
    value: String,
    label: String,
}

/// Translation response
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub direction: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl ErrorResponse {
    fn new(message: impl Into<String>, code: &str, kind: &str) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                code: Some(code.to_string()),
                r#type: Some(kind.to_string()),
            },
        }
    }
}

/// Serve the form UI
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> axum::Json<HealthResponse> {
    let loaded = state.registry.loaded_directions().await;
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        loaded_directions: loaded.iter().map(|d| d.as_str().to_string()).collect(),
    })
}

/// List the two supported directions
async fn get_directions() -> axum::Json<DirectionsResponse> {
    let directions = Direction::all()
        .into_iter()
        .map(|d| DirectionInfo {
            value: d.as_str().to_string(),
            label: d.label().to_string(),
        })
        .collect();

    axum::Json(DirectionsResponse { directions })
}

/// Translation handler
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslationRequest>,
) -> Result<axum::Json<TranslateResponse>, axum::Json<ErrorResponse>> {
    if payload.is_empty_input() {
        // Never reaches the model layer; the UI shows this as a warning.
        return Err(axum::Json(ErrorResponse::new(
            "Please enter a sentence.",
            "empty_input",
            "invalid_request_error",
        )));
    }

    match state.registry.translate(&payload).await {
        Ok(result) => Ok(axum::Json(TranslateResponse {
            translation: result.translation,
            direction: result.direction.as_str().to_string(),
            input_tokens: result.input_tokens,
            output_tokens: result.output_tokens,
            duration_ms: result.duration_ms,
        })),
        Err(e) => {
            warn!("Translation failed: {}", e);
            Err(axum::Json(ErrorResponse::new(
                e.to_string(),
                e.code(),
                "api_error",
            )))
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/directions", get(get_directions))
        .route("/api/translate", post(translate))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    let registry = Arc::new(ModelRegistry::from_env()?);
    let state = Arc::new(AppState::new(registry));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TranslatorConfig;
    use crate::core::models::{EncodeOptions, GenerationOptions};

    fn test_state() -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslatorConfig {
            ar_en_model_dir: dir.path().join("ar-en"),
            en_ar_model_dir: dir.path().join("en-ar"),
            encode: EncodeOptions::default(),
            generation: GenerationOptions::default(),
        };
        let registry = Arc::new(ModelRegistry::new(config).unwrap());
        Arc::new(AppState::new(registry))
    }

    #[tokio::test]
    async fn test_translate_rejects_empty_text_with_warning_code() {
        let state = test_state();
        let payload = TranslationRequest::new(Direction::EnglishToArabic, "  \n ");

        let err = translate(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(err.0.error.code.as_deref(), Some("empty_input"));
        assert_eq!(err.0.error.message, "Please enter a sentence.");
    }

    #[tokio::test]
    async fn test_translate_surfaces_initialization_error() {
        let state = test_state();
        let payload = TranslationRequest::new(Direction::ArabicToEnglish, "مرحبا");

        let err = translate(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(err.0.error.code.as_deref(), Some("initialization_error"));
    }

    #[tokio::test]
    async fn test_directions_listing_is_the_closed_choice_set() {
        let response = get_directions().await;
        let directions = &response.0.directions;

        assert_eq!(directions.len(), 2);
        assert_eq!(directions[0].value, "arabic_to_english");
        assert_eq!(directions[0].label, "Arabic to English");
        assert_eq!(directions[1].value, "english_to_arabic");
        assert_eq!(directions[1].label, "English to Arabic");
    }

    #[tokio::test]
    async fn test_health_reports_nothing_loaded_initially() {
        let state = test_state();
        let response = health_check(State(state)).await;

        assert_eq!(response.0.status, "ok");
        assert!(response.0.loaded_directions.is_empty());
    }
}
