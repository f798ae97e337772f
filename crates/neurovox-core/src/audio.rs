//! Mono audio buffer passed between pipeline stages.

use crate::dsp;

/// Mono f32 samples at a known rate.
///
/// Created by the synthesis adapter, transformed by the post processor and
/// consumed once by the WAV encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples, in `[-1.0, 1.0]` once normalized
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new buffer
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest absolute sample value
    #[must_use]
    pub fn peak(&self) -> f32 {
        dsp::peak(&self.samples)
    }

    /// Whether every sample is zero
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.peak() <= f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_peak() {
        let buffer = AudioBuffer::new(vec![0.0, -0.5, 0.25, 0.0], 4);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.peak(), 0.5);
        assert!(!buffer.is_silent());
        assert!(AudioBuffer::new(vec![0.0; 8], 22_050).is_silent());
    }
}
