//! Synthesis adapter over one loaded acoustic model.
//!
//! The adapter walks an ordered candidate list once at startup, keeps the
//! first model that loads and dispatches every request to it according to
//! the model's kind.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::audio::AudioBuffer;
use crate::dsp;
use crate::error::{LoadAttempt, NeurovoxError, NeurovoxResult};
use crate::model::{AcousticModel, Conditioning, ModelInfo, ModelKind, ModelLoader};
use crate::voice::VoiceCatalog;
use crate::{FALLBACK_SAMPLE_RATE, MAX_SPEED, MIN_SPEED};

/// Language tag sent to multilingual models
pub const MULTILINGUAL_LANGUAGE: &str = "en";

/// Owns the single loaded model
#[derive(Debug)]
pub struct SynthesisAdapter {
    model: Box<dyn AcousticModel>,
    gate: Mutex<()>,
    attempts: Vec<LoadAttempt>,
}

impl SynthesisAdapter {
    /// Load the first model of `candidates` that `loader` can bring up.
    ///
    /// # Errors
    ///
    /// Returns [`NeurovoxError::ModelsExhausted`] listing every failed attempt
    /// if no candidate loads.
    pub fn initialize(
        candidates: &[&'static ModelInfo],
        loader: &dyn ModelLoader,
    ) -> NeurovoxResult<Self> {
        let mut attempts = Vec::new();

        for &info in candidates {
            info!(model = info.id, name = info.model_name, "Loading acoustic model");
            match loader.load(info) {
                Ok(model) => {
                    info!(model = info.id, kind = ?info.kind(), failed_before = attempts.len(), "Acoustic model loaded");
                    return Ok(Self::from_model(model, attempts));
                }
                Err(e) => {
                    warn!(model = info.id, error = %e, "Failed to load acoustic model");
                    attempts.push(LoadAttempt {
                        model_id: info.id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(NeurovoxError::ModelsExhausted { attempts })
    }

    /// Wrap an already loaded model
    #[must_use]
    pub fn with_model(model: Box<dyn AcousticModel>) -> Self {
        Self::from_model(model, Vec::new())
    }

    fn from_model(model: Box<dyn AcousticModel>, attempts: Vec<LoadAttempt>) -> Self {
        Self {
            model,
            gate: Mutex::new(()),
            attempts,
        }
    }

    /// Catalog entry of the loaded model
    #[must_use]
    pub fn model_info(&self) -> &'static ModelInfo {
        self.model.info()
    }

    /// Id of the loaded model
    #[must_use]
    pub fn model_id(&self) -> &'static str {
        self.model.info().id
    }

    /// Kind of the loaded model
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.model.info().kind()
    }

    /// Candidates that failed before the loaded one
    #[must_use]
    pub fn failed_attempts(&self) -> &[LoadAttempt] {
        &self.attempts
    }

    /// Conditioning for a resolved voice on the loaded model
    #[must_use]
    pub fn conditioning_for(&self, voice: &str) -> Conditioning {
        match self.kind() {
            ModelKind::Multilingual => Conditioning::language(MULTILINGUAL_LANGUAGE),
            ModelKind::MultiSpeaker => Conditioning::speaker(VoiceCatalog::speaker_code(voice)),
            ModelKind::SingleSpeaker => Conditioning::none(),
        }
    }

    /// Synthesize `text` with an already resolved voice.
    ///
    /// The result is time-stretched when `speed != 1.0` and then
    /// peak-normalized.
    ///
    /// # Errors
    ///
    /// Returns a synthesis error if `speed` is outside `[0.5, 2.0]`, the
    /// model fails, or the model produces no samples or non-finite ones.
    pub fn synthesize(&self, text: &str, voice: &str, speed: f32) -> NeurovoxResult<AudioBuffer> {
        if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(NeurovoxError::synthesis(format!(
                "Speed must be between {MIN_SPEED} and {MAX_SPEED}, got {speed}"
            )));
        }

        let conditioning = self.conditioning_for(voice);
        debug!(
            model = self.model_id(),
            voice,
            chars = text.chars().count(),
            ?conditioning,
            "Running acoustic model"
        );

        let raw = if self.model.is_reentrant() {
            self.model.synthesize(text, &conditioning)
        } else {
            let _guard = self.gate.lock();
            self.model.synthesize(text, &conditioning)
        }
        .map_err(|e| match e {
            NeurovoxError::SynthesisError { .. } => e,
            other => NeurovoxError::synthesis(format!("{} failed: {other}", self.model_id())),
        })?;

        if raw.samples.is_empty() {
            return Err(NeurovoxError::synthesis(format!(
                "{} produced no audio",
                self.model_id()
            )));
        }
        if raw.samples.iter().any(|s| !s.is_finite()) {
            return Err(NeurovoxError::synthesis(format!(
                "{} produced non-finite samples",
                self.model_id()
            )));
        }

        let sample_rate = raw.sample_rate.filter(|&rate| rate > 0).unwrap_or(FALLBACK_SAMPLE_RATE);
        let stretched = if (speed - 1.0).abs() > f32::EPSILON {
            dsp::time_stretch(&raw.samples, speed)
        } else {
            raw.samples
        };

        Ok(AudioBuffer::new(dsp::peak_normalize(&stretched), sample_rate))
    }
}
