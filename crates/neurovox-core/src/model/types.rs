// Static model catalog and model kinds

use crate::voice::Quality;
use serde::Serialize;

/// How a loaded model is conditioned at synthesis time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Multilingual model driven by a language tag
    Multilingual,
    /// One model with a fixed set of speaker embeddings
    MultiSpeaker,
    /// One voice, text only
    SingleSpeaker,
}

/// Static description of a model the service knows how to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Catalog identifier, also reported as the active model id
    pub id: &'static str,
    /// Name of the model on the model server
    pub model_name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Language code, or `multilingual`
    pub language: &'static str,
    /// Quality tier
    pub quality: Quality,
    /// Speaker baked into this entry, for multi-speaker models
    pub speaker: Option<&'static str>,
}

impl ModelInfo {
    /// Conditioning style implied by this entry
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        if self.language == "multilingual" {
            ModelKind::Multilingual
        } else if self.speaker.is_some() {
            ModelKind::MultiSpeaker
        } else {
            ModelKind::SingleSpeaker
        }
    }

    /// Look up a catalog entry by id
    #[must_use]
    pub fn find(id: &str) -> Option<&'static Self> {
        MODEL_CATALOG.iter().find(|info| info.id == id)
    }
}

/// Every model the service can describe
pub static MODEL_CATALOG: [ModelInfo; 5] = [
    ModelInfo {
        id: "jenny",
        model_name: "tts_models/en/ljspeech/tacotron2-DDC_ph",
        description: "High-quality female voice (Jenny)",
        language: "en",
        quality: Quality::Premium,
        speaker: None,
    },
    ModelInfo {
        id: "vctk_p239",
        model_name: "tts_models/en/vctk/vits",
        description: "High-quality female voice (VCTK)",
        language: "en",
        quality: Quality::Premium,
        speaker: Some("p239"),
    },
    ModelInfo {
        id: "vctk_p243",
        model_name: "tts_models/en/vctk/vits",
        description: "High-quality male voice (VCTK)",
        language: "en",
        quality: Quality::Premium,
        speaker: Some("p243"),
    },
    ModelInfo {
        id: "fairseq_mary",
        model_name: "tts_models/en/ljspeech/fast_pitch",
        description: "Fast, high-quality synthesis",
        language: "en",
        quality: Quality::Fast,
        speaker: None,
    },
    ModelInfo {
        id: "xtts_v2",
        model_name: "tts_models/multilingual/multi-dataset/xtts_v2",
        description: "XTTS v2 - Ultra high quality, multilingual",
        language: "multilingual",
        quality: Quality::Ultra,
        speaker: None,
    },
];

/// Startup load order: best quality first
pub const FALLBACK_CHAIN: [&str; 3] = ["xtts_v2", "vctk_p239", "jenny"];

/// Catalog entries of the fallback chain, in load order
#[must_use]
pub fn fallback_chain() -> Vec<&'static ModelInfo> {
    FALLBACK_CHAIN
        .iter()
        .filter_map(|id| ModelInfo::find(id))
        .collect()
}
