//! Acoustic model boundary.
//!
//! The neural model itself is external. This module defines the pluggable
//! seam the synthesis adapter talks to: a [`ModelLoader`] that turns a
//! catalog entry into a loaded [`AcousticModel`], and the model trait that
//! turns text into raw samples.

/// Model server backend over HTTP
pub mod http_backend;
/// Static catalog of known models
pub mod types;

pub use http_backend::{HttpAcousticModel, HttpModelLoader};
pub use types::{fallback_chain, ModelInfo, ModelKind, FALLBACK_CHAIN, MODEL_CATALOG};

use crate::error::NeurovoxResult;

/// Raw model output before any post-processing
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    /// Mono samples, unnormalized
    pub samples: Vec<f32>,
    /// Output rate if the model reported one
    pub sample_rate: Option<u32>,
}

/// Per-call conditioning passed to the model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditioning {
    /// Language tag, for multilingual models
    pub language: Option<String>,
    /// Speaker tag, for multi-speaker models
    pub speaker: Option<String>,
}

impl Conditioning {
    /// Text-only conditioning
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Condition on a language tag
    #[must_use]
    pub fn language<S: Into<String>>(language: S) -> Self {
        Self {
            language: Some(language.into()),
            speaker: None,
        }
    }

    /// Condition on a speaker tag
    #[must_use]
    pub fn speaker<S: Into<String>>(speaker: S) -> Self {
        Self {
            language: None,
            speaker: Some(speaker.into()),
        }
    }
}

/// A loaded acoustic model
pub trait AcousticModel: Send + Sync + std::fmt::Debug {
    /// Catalog entry this model was loaded from
    fn info(&self) -> &'static ModelInfo;

    /// Synthesize text into raw samples
    ///
    /// # Errors
    ///
    /// Returns an error if the model rejects the input or inference fails.
    fn synthesize(&self, text: &str, conditioning: &Conditioning) -> NeurovoxResult<RawAudio>;

    /// Whether concurrent `synthesize` calls are safe.
    ///
    /// Defaults to `false`, which makes the adapter serialize calls.
    fn is_reentrant(&self) -> bool {
        false
    }
}

/// Loads models named by catalog entries
#[cfg_attr(test, mockall::automock)]
pub trait ModelLoader: Send + Sync {
    /// Load one model
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unavailable or fails to initialize.
    fn load(&self, info: &'static ModelInfo) -> NeurovoxResult<Box<dyn AcousticModel>>;
}
