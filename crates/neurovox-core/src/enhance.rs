//! Post-synthesis enhancement.
//!
//! Resample, normalize, compress, then leave headroom. Enhancement never
//! fails a request: on error the input buffer is returned as-is.

use tracing::{debug, warn};

use crate::audio::AudioBuffer;
use crate::dsp;
use crate::error::NeurovoxResult;
use crate::DEFAULT_TARGET_SAMPLE_RATE;

/// Knobs for [`AudioPostProcessor`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceSettings {
    /// Output sample rate in Hz
    pub target_rate: u32,
    /// Magnitude above which compression kicks in
    pub threshold: f32,
    /// Compression ratio above the threshold
    pub ratio: f32,
    /// Final gain
    pub headroom: f32,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            target_rate: DEFAULT_TARGET_SAMPLE_RATE,
            threshold: 0.8,
            ratio: 4.0,
            headroom: 0.95,
        }
    }
}

/// Applies the enhancement chain to synthesized audio
#[derive(Debug, Clone, Default)]
pub struct AudioPostProcessor {
    settings: EnhanceSettings,
}

impl AudioPostProcessor {
    /// Create a post processor with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a post processor with custom settings
    #[must_use]
    pub fn with_settings(settings: EnhanceSettings) -> Self {
        Self { settings }
    }

    /// Enhance `buffer`, falling back to the untouched input on failure
    #[must_use]
    pub fn enhance(&self, buffer: &AudioBuffer) -> AudioBuffer {
        match self.try_enhance(buffer) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!(
                    stage = "enhance",
                    samples = buffer.len(),
                    sample_rate = buffer.sample_rate,
                    error = %e,
                    "Audio enhancement failed, returning unenhanced audio"
                );
                buffer.clone()
            }
        }
    }

    /// Enhance `buffer`
    ///
    /// # Errors
    ///
    /// Returns an error if resampling fails.
    pub fn try_enhance(&self, buffer: &AudioBuffer) -> NeurovoxResult<AudioBuffer> {
        let s = &self.settings;
        let resampled = dsp::resample(&buffer.samples, buffer.sample_rate, s.target_rate)?;
        let normalized = dsp::peak_normalize(&resampled);
        let compressed = dsp::compress(&normalized, s.threshold, s.ratio);
        let samples = dsp::apply_gain(&compressed, s.headroom);

        debug!(
            from_rate = buffer.sample_rate,
            to_rate = s.target_rate,
            samples = samples.len(),
            "Enhanced audio"
        );
        Ok(AudioBuffer::new(samples, s.target_rate))
    }
}
