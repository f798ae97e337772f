//! Neurovox Server
//!
//! HTTP endpoints for neural text-to-speech on top of `neurovox-core`.

pub mod config;
pub mod http;
pub mod state;

pub use config::{Args, ServerConfig};
pub use http::create_router;
pub use state::AppState;

use anyhow::Context;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use neurovox_core::{
    fallback_chain, AudioPostProcessor, EnhanceSettings, HttpModelLoader, ModelLoader,
    NeurovoxError, SynthesisAdapter, TtsService, WavEncoder,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingSection;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or unusable request
    #[error("{0}")]
    InvalidRequest(String),

    /// The pipeline failed
    #[error("{0}")]
    Synthesis(NeurovoxError),

    /// Bad configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Synthesis(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<NeurovoxError> for ServerError {
    fn from(err: NeurovoxError) -> Self {
        match err {
            NeurovoxError::InvalidInput { message } => Self::InvalidRequest(message),
            other => Self::Synthesis(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Model loader talking to the configured model servers
#[must_use]
pub fn http_loader(config: &ServerConfig) -> HttpModelLoader {
    HttpModelLoader::new(config.models.clone())
        .with_timeout(config.engine.request_timeout())
        .with_reentrant(config.engine.concurrent_synthesis)
}

/// Load a model through the fallback chain and assemble the shared state.
///
/// Blocking; call it before the async runtime starts.
///
/// # Errors
///
/// Returns an error listing every attempt if no model in the chain loads.
pub fn bootstrap(config: ServerConfig, loader: &dyn ModelLoader) -> anyhow::Result<AppState> {
    let chain = fallback_chain();
    let adapter = SynthesisAdapter::initialize(&chain, loader)
        .context("Failed to load any acoustic model")?;
    for attempt in adapter.failed_attempts() {
        warn!(model = %attempt.model_id, reason = %attempt.reason, "Skipped model during startup");
    }

    let post = AudioPostProcessor::with_settings(EnhanceSettings {
        target_rate: config.engine.target_sample_rate,
        ..EnhanceSettings::default()
    });
    let encoder = WavEncoder::new(config.engine.output_dir());
    let service = TtsService::new(adapter, post, encoder).with_device(config.engine.device);

    info!(
        model = service.model_info().id,
        voices = service.voices().len(),
        default_voice = %service.default_voice(),
        device = %service.device(),
        "Synthesis service ready"
    );
    Ok(AppState::new(service, config))
}

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(logging: &LoggingSection) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        if level.contains('=') {
            EnvFilter::new(level)
        } else {
            EnvFilter::new(format!("neurovox={level},neurovox_core={level},neurovox_server={level},tower_http={level}"))
        }
    });

    let fmt_layer = if logging.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing")
}
