//! HTTP Endpoints
//!
//! REST API for synthesis and service introspection.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderValue},
    response::Response,
    routing::{get, post},
    Router,
};
use neurovox_core::model::FALLBACK_CHAIN;
use neurovox_core::wav::WAV_MIME_TYPE;
use neurovox_core::{ModelInfo, ModelKind, SynthesisRequest, VoiceCatalog, MODEL_CATALOG};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;
use crate::ServerError;

/// Engine name reported by `/health`
pub const ENGINE_NAME: &str = "Neurovox Neural TTS";

/// Capabilities reported by `/health`
pub const FEATURES: [&str; 5] = [
    "neural_synthesis",
    "multi_speaker",
    "speed_control",
    "audio_enhancement",
    "high_quality",
];

/// Text returned by `/demo`
pub const DEMO_TEXT: &str = "Hello! This is a demonstration of advanced neural text-to-speech technology. The voice quality should be remarkably natural and expressive.";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tts", post(text_to_speech))
        .route("/health", get(health))
        .route("/voices", get(list_voices))
        .route("/demo", get(demo))
        .route("/models", get(list_models))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}

/// Synthesis request body
#[derive(Debug, Deserialize)]
struct TtsBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    speed: Option<f32>,
}

/// Synthesize speech and return it as a WAV attachment
async fn text_to_speech(
    State(state): State<AppState>,
    payload: Result<Json<TtsBody>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(body) =
        payload.map_err(|e| ServerError::InvalidRequest(format!("Invalid JSON body: {}", e.body_text())))?;

    let text = body
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("Text is required".to_string()))?;
    let request = SynthesisRequest {
        text,
        voice: body.voice,
        speed: body.speed,
    };

    let service = Arc::clone(&state.service);
    let speech = tokio::task::spawn_blocking(move || service.process(&request))
        .await
        .map_err(|e| ServerError::Internal(format!("Synthesis task failed: {e}")))??;

    info!(
        filename = %speech.filename,
        bytes = speech.wav.len(),
        voice = %speech.voice,
        model = speech.model_id,
        "Speech generated"
    );

    Response::builder()
        .header(header::CONTENT_TYPE, WAV_MIME_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", speech.filename),
        )
        .header("X-Voice-Used", header_value(&speech.voice))
        // Debug formatting keeps the decimal point, e.g. "1.0"
        .header("X-Speed-Multiplier", format!("{:?}", speech.speed))
        .header("X-Sample-Rate", speech.sample_rate.to_string())
        .header("X-Model", speech.model_id)
        .body(Body::from(speech.wav))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {e}")))
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// Health check with service details
async fn health(State(state): State<AppState>) -> Json<Value> {
    let service = &state.service;
    let names: Vec<&str> = service.voices().iter().map(|v| v.name.as_str()).collect();

    Json(json!({
        "status": "healthy",
        "mode": "neural_tts",
        "system": std::env::consts::OS,
        "architecture": std::env::consts::ARCH,
        "engine": ENGINE_NAME,
        "device": service.device(),
        "model": service.model_info().id,
        "default_voice": service.default_voice(),
        "available_voices": names,
        "total_voices": names.len(),
        "features": FEATURES,
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at.to_rfc3339(),
    }))
}

/// List voices of the loaded model
async fn list_voices(State(state): State<AppState>) -> Json<Value> {
    let service = &state.service;
    let info = service.model_info();

    Json(json!({
        "available_voices": service.voices(),
        "default": service.default_voice(),
        "model_info": {
            "name": info.id,
            "device": service.device(),
            "quality": info.quality,
        },
        "recommended": VoiceCatalog::group_by_gender(service.voices()),
    }))
}

/// Demo text and a few voices to try
async fn demo(State(state): State<AppState>) -> Json<Value> {
    let service = &state.service;
    let suggested: Vec<&str> = service
        .voices()
        .iter()
        .take(3)
        .map(|v| v.name.as_str())
        .collect();

    Json(json!({
        "demo_text": DEMO_TEXT,
        "suggested_voices": suggested,
        "usage": format!(
            "POST to /api/tts with: {{\"text\": \"your text\", \"voice\": \"{}\", \"speed\": 1.0}}",
            service.default_voice()
        ),
        "model": service.model_info().id,
    }))
}

/// Catalog entry with load status
#[derive(Debug, Serialize)]
struct ModelEntry {
    #[serde(flatten)]
    info: &'static ModelInfo,
    kind: ModelKind,
    loaded: bool,
}

/// Static model catalog and the startup fallback order
async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let loaded = state.service.model_info().id;
    let models: Vec<ModelEntry> = MODEL_CATALOG
        .iter()
        .map(|info| ModelEntry {
            info,
            kind: info.kind(),
            loaded: info.id == loaded,
        })
        .collect();

    Json(json!({
        "models": models,
        "fallback_chain": FALLBACK_CHAIN,
        "loaded": loaded,
    }))
}
