//! Request pipeline: validate, normalize, resolve voice, synthesize,
//! enhance, encode.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::audio::AudioBuffer;
use crate::enhance::AudioPostProcessor;
use crate::error::{NeurovoxError, NeurovoxResult};
use crate::model::ModelInfo;
use crate::synthesis::SynthesisAdapter;
use crate::text::TextNormalizer;
use crate::voice::{VoiceCatalog, VoiceDescriptor};
use crate::wav::WavEncoder;
use crate::{MAX_SPEED, MIN_SPEED};

/// Device reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsDevice {
    /// CPU
    #[default]
    Cpu,
    /// GPU
    Gpu,
    /// Left to the model server
    Auto,
}

impl TtsDevice {
    /// Lowercase name as reported over HTTP
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for TtsDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthesis request as received from a client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Requested voice; empty or unknown selects the default
    #[serde(default)]
    pub voice: Option<String>,
    /// Speed multiplier, defaults to 1.0
    #[serde(default)]
    pub speed: Option<f32>,
}

impl SynthesisRequest {
    /// Create a request with default voice and speed
    #[must_use]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            voice: None,
            speed: None,
        }
    }

    /// Request a voice
    #[must_use]
    pub fn with_voice<S: Into<String>>(mut self, voice: S) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Request a speed multiplier
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Speed clamped to `[0.5, 2.0]`; missing or NaN means 1.0
    #[must_use]
    pub fn clamped_speed(&self) -> f32 {
        match self.speed {
            Some(speed) if !speed.is_nan() => speed.clamp(MIN_SPEED, MAX_SPEED),
            _ => 1.0,
        }
    }
}

/// Result of a successful request
#[derive(Debug, Clone)]
pub struct SynthesizedSpeech {
    /// Complete WAV file
    pub wav: Vec<u8>,
    /// Suggested download name, `<uuid>.wav`
    pub filename: String,
    /// Voice that was actually used
    pub voice: String,
    /// Speed multiplier that was actually applied
    pub speed: f32,
    /// Output sample rate
    pub sample_rate: u32,
    /// Id of the model that produced the audio
    pub model_id: &'static str,
}

/// Shared synthesis service, one per process
#[derive(Debug)]
pub struct TtsService {
    normalizer: TextNormalizer,
    adapter: SynthesisAdapter,
    voices: Vec<VoiceDescriptor>,
    post: AudioPostProcessor,
    encoder: WavEncoder,
    device: TtsDevice,
}

impl TtsService {
    /// Build the service around a loaded adapter
    #[must_use]
    pub fn new(adapter: SynthesisAdapter, post: AudioPostProcessor, encoder: WavEncoder) -> Self {
        let voices = VoiceCatalog::available_voices(adapter.kind());
        Self {
            normalizer: TextNormalizer::new(),
            adapter,
            voices,
            post,
            encoder,
            device: TtsDevice::default(),
        }
    }

    /// Set the reported inference device
    #[must_use]
    pub fn with_device(mut self, device: TtsDevice) -> Self {
        self.device = device;
        self
    }

    /// Voices exposed by the loaded model
    #[must_use]
    pub fn voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    /// Voice used when a request names none
    #[must_use]
    pub fn default_voice(&self) -> String {
        VoiceCatalog::resolve(None, &self.voices)
    }

    /// Catalog entry of the loaded model
    #[must_use]
    pub fn model_info(&self) -> &'static ModelInfo {
        self.adapter.model_info()
    }

    /// Reported inference device
    #[must_use]
    pub fn device(&self) -> TtsDevice {
        self.device
    }

    /// Run one request through the whole pipeline.
    ///
    /// Blocking; async callers should run it on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns [`NeurovoxError::InvalidInput`] for empty or unspeakable text,
    /// or a synthesis/encoding error if the model or encoder fails.
    pub fn process(&self, request: &SynthesisRequest) -> NeurovoxResult<SynthesizedSpeech> {
        if request.text.trim().is_empty() {
            return Err(NeurovoxError::invalid_input("No text provided"));
        }

        let text = self.normalizer.normalize(&request.text);
        if text.is_empty() {
            return Err(NeurovoxError::invalid_input(
                "Text contains nothing speakable after normalization",
            ));
        }

        let voice = VoiceCatalog::resolve(request.voice.as_deref(), &self.voices);
        let speed = request.clamped_speed();
        info!(
            chars = text.chars().count(),
            voice = %voice,
            speed,
            model = self.adapter.model_id(),
            "Synthesizing speech"
        );

        let raw = self
            .adapter
            .synthesize(&text, &voice, speed)
            .map_err(|e| {
                error!(stage = "synthesis", chars = text.chars().count(), error = %e, "Synthesis failed");
                e
            })?;
        let enhanced = self.post.enhance(&raw);
        let wav = self.encode(&enhanced)?;

        Ok(SynthesizedSpeech {
            wav,
            filename: format!("{}.wav", Uuid::new_v4()),
            voice,
            speed,
            sample_rate: enhanced.sample_rate,
            model_id: self.adapter.model_id(),
        })
    }

    fn encode(&self, buffer: &AudioBuffer) -> NeurovoxResult<Vec<u8>> {
        self.encoder.encode(buffer).map_err(|e| {
            error!(stage = "encode", samples = buffer.len(), error = %e, "Encoding failed");
            e
        })
    }
}
