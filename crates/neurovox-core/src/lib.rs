//! # Neurovox Core
//!
//! Request-to-audio pipeline for a neural text-to-speech service.
//!
//! ## Features
//!
//! - Deterministic text normalization for neural synthesis
//! - Startup model fallback chain over pluggable acoustic models
//! - Voice catalog derived from whichever model loaded
//! - Pitch-preserving speed control, resampling and loudness enhancement
//! - 16-bit PCM WAV output
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use neurovox_core::{
//!     fallback_chain, AudioPostProcessor, HttpModelLoader, SynthesisAdapter, SynthesisRequest,
//!     TtsService, WavEncoder,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let endpoints = BTreeMap::from([("jenny".to_string(), "http://127.0.0.1:5022".to_string())]);
//!     let adapter = SynthesisAdapter::initialize(&fallback_chain(), &HttpModelLoader::new(endpoints))?;
//!     let service = TtsService::new(adapter, AudioPostProcessor::new(), WavEncoder::default());
//!
//!     let speech = service.process(&SynthesisRequest::new("Hello, world!"))?;
//!     std::fs::write(&speech.filename, &speech.wav)?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod audio;
pub mod dsp;
pub mod enhance;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod synthesis;
pub mod text;
pub mod voice;
pub mod wav;

// Re-export main types for convenience
pub use audio::AudioBuffer;
pub use enhance::{AudioPostProcessor, EnhanceSettings};
pub use error::{LoadAttempt, NeurovoxError, NeurovoxResult};
pub use model::{
    fallback_chain, AcousticModel, Conditioning, HttpModelLoader, ModelInfo, ModelKind,
    ModelLoader, RawAudio, MODEL_CATALOG,
};
pub use pipeline::{SynthesisRequest, SynthesizedSpeech, TtsDevice, TtsService};
pub use synthesis::SynthesisAdapter;
pub use text::TextNormalizer;
pub use voice::{Gender, GenderGroups, Quality, VoiceCatalog, VoiceDescriptor};
pub use wav::WavEncoder;

/// Version information for the neurovox-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output sample rate after enhancement (22.05 kHz)
pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 22_050;

/// Sample rate assumed when a model does not report one
pub const FALLBACK_SAMPLE_RATE: u32 = 22_050;

/// Slowest accepted speed multiplier
pub const MIN_SPEED: f32 = 0.5;

/// Fastest accepted speed multiplier
pub const MAX_SPEED: f32 = 2.0;
