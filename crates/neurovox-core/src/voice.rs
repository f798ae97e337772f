//! Voice catalog and selection policy.
//!
//! The voices a client may pick are entirely determined by which acoustic
//! model won the startup fallback chain.

use crate::model::ModelKind;
use serde::{Deserialize, Serialize};

/// Speakers the multi-speaker model knows about
pub const MULTI_SPEAKER_CODES: [&str; 4] = ["p225", "p226", "p239", "p243"];

/// Speaker used when a multi-speaker request names an unknown speaker
pub const DEFAULT_SPEAKER_CODE: &str = "p239";

/// Quality tier of a voice or model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Low-latency synthesis
    Fast,
    /// High-quality synthesis
    Premium,
    /// Best available synthesis
    Ultra,
}

impl Quality {
    /// Lowercase name as exposed over HTTP
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Premium => "premium",
            Self::Ultra => "ultra",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender tag guessed from a voice description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male voice
    Male,
    /// Female voice
    Female,
    /// Description names neither
    Neutral,
}

/// A voice a client can request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Name clients send in the `voice` field
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Quality tier
    pub quality: Quality,
}

impl VoiceDescriptor {
    /// Create a new voice descriptor
    #[must_use]
    pub fn new(name: &str, description: &str, quality: Quality) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            quality,
        }
    }

    /// Best-effort gender tag from whole words of the description.
    ///
    /// Matching whole words keeps "female" from also counting as "male".
    #[must_use]
    pub fn gender(&self) -> Gender {
        let words = self
            .description
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase);
        let mut gender = Gender::Neutral;
        for word in words {
            match word.as_str() {
                "female" | "woman" => return Gender::Female,
                "male" | "man" => gender = Gender::Male,
                _ => {}
            }
        }
        gender
    }
}

/// Voices grouped by their description's gender tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenderGroups {
    /// Voices tagged female
    pub female: Vec<String>,
    /// Voices tagged male
    pub male: Vec<String>,
}

/// Static voice registry and resolution policy
pub struct VoiceCatalog;

impl VoiceCatalog {
    /// Voices exposed for a loaded model, in default-first order
    #[must_use]
    pub fn available_voices(kind: ModelKind) -> Vec<VoiceDescriptor> {
        match kind {
            ModelKind::Multilingual => vec![
                VoiceDescriptor::new("female_1", "Natural female voice", Quality::Ultra),
                VoiceDescriptor::new("male_1", "Natural male voice", Quality::Ultra),
                VoiceDescriptor::new("female_2", "Expressive female voice", Quality::Ultra),
                VoiceDescriptor::new("male_2", "Deep male voice", Quality::Ultra),
            ],
            ModelKind::MultiSpeaker => vec![
                VoiceDescriptor::new("p239", "Young female voice", Quality::Premium),
                VoiceDescriptor::new("p243", "Mature male voice", Quality::Premium),
                VoiceDescriptor::new("p225", "Female voice", Quality::Premium),
                VoiceDescriptor::new("p226", "Male voice", Quality::Premium),
            ],
            ModelKind::SingleSpeaker => vec![VoiceDescriptor::new(
                "default",
                "High-quality neural voice",
                Quality::Premium,
            )],
        }
    }

    /// Pick the voice to synthesize with.
    ///
    /// A missing, empty or unknown request falls back to the first available
    /// voice. Returns `"default"` only if `available` is empty.
    #[must_use]
    pub fn resolve(requested: Option<&str>, available: &[VoiceDescriptor]) -> String {
        requested
            .filter(|name| !name.is_empty())
            .and_then(|name| available.iter().find(|voice| voice.name == name))
            .or_else(|| available.first())
            .map_or_else(|| "default".to_string(), |voice| voice.name.clone())
    }

    /// Group voice names by gender for display
    #[must_use]
    pub fn group_by_gender(voices: &[VoiceDescriptor]) -> GenderGroups {
        let mut groups = GenderGroups::default();
        for voice in voices {
            match voice.gender() {
                Gender::Female => groups.female.push(voice.name.clone()),
                Gender::Male => groups.male.push(voice.name.clone()),
                Gender::Neutral => {}
            }
        }
        groups
    }

    /// Speaker tag to send to the multi-speaker model
    #[must_use]
    pub fn speaker_code(voice: &str) -> &str {
        MULTI_SPEAKER_CODES
            .iter()
            .find(|code| **code == voice)
            .copied()
            .unwrap_or(DEFAULT_SPEAKER_CODE)
    }
}
