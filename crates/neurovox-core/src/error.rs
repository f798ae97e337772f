//! Error types for the Neurovox synthesis pipeline.

use std::fmt;

/// Result type alias for Neurovox operations
pub type NeurovoxResult<T> = Result<T, NeurovoxError>;

/// One failed attempt of the startup model fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    /// Catalog id of the model that was tried
    pub model_id: String,
    /// Why loading it failed
    pub reason: String,
}

impl fmt::Display for LoadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model_id, self.reason)
    }
}

fn join_attempts(attempts: &[LoadAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for Neurovox operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NeurovoxError {
    /// Request validation failed
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message describing the invalid input
        message: String,
    },

    /// A single acoustic model could not be loaded
    #[error("Model loading error: {message}")]
    ModelError {
        /// Error message describing the model loading failure
        message: String,
    },

    /// Every candidate in the fallback chain failed to load
    #[error("No acoustic model could be loaded ({})", join_attempts(.attempts))]
    ModelsExhausted {
        /// Each attempt in chain order
        attempts: Vec<LoadAttempt>,
    },

    /// Speech synthesis failed
    #[error("TTS synthesis failed: {message}")]
    SynthesisError {
        /// Error message describing the failure
        message: String,
    },

    /// Resampling, compression or encoding failed
    #[error("Audio processing error: {message}")]
    AudioProcessingError {
        /// Error message describing the processing issue
        message: String,
    },

    /// File I/O error
    #[error("File I/O error: {message}")]
    FileError {
        /// Error message describing the file operation failure
        message: String,
    },

    /// Talking to a model server failed
    #[error("Network error: {message}")]
    NetworkError {
        /// Error message describing the network issue
        message: String,
    },
}

impl NeurovoxError {
    /// Create a new invalid input error
    #[must_use]
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new model error
    #[must_use]
    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::ModelError {
            message: message.into(),
        }
    }

    /// Create a new synthesis error
    #[must_use]
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::SynthesisError {
            message: message.into(),
        }
    }

    /// Create a new audio processing error
    #[must_use]
    pub fn audio_processing<S: Into<String>>(message: S) -> Self {
        Self::AudioProcessingError {
            message: message.into(),
        }
    }

    /// Create a new file error
    #[must_use]
    pub fn file<S: Into<String>>(message: S) -> Self {
        Self::FileError {
            message: message.into(),
        }
    }

    /// Create a new network error
    #[must_use]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Check if this error is due to invalid user input
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Get the error category for logging
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "input",
            Self::ModelError { .. } | Self::ModelsExhausted { .. } => "model",
            Self::SynthesisError { .. } => "synthesis",
            Self::AudioProcessingError { .. } => "audio_processing",
            Self::FileError { .. } => "file",
            Self::NetworkError { .. } => "network",
        }
    }
}

impl From<std::io::Error> for NeurovoxError {
    fn from(err: std::io::Error) -> Self {
        Self::file(err.to_string())
    }
}

impl From<hound::Error> for NeurovoxError {
    fn from(err: hound::Error) -> Self {
        Self::audio_processing(format!("WAV codec error: {err}"))
    }
}

impl From<reqwest::Error> for NeurovoxError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(NeurovoxError::invalid_input("x").category(), "input");
        assert_eq!(NeurovoxError::model("x").category(), "model");
        assert_eq!(NeurovoxError::synthesis("x").category(), "synthesis");
        assert_eq!(NeurovoxError::audio_processing("x").category(), "audio_processing");
        assert_eq!(NeurovoxError::file("x").category(), "file");
        assert_eq!(NeurovoxError::network("x").category(), "network");
    }

    #[test]
    fn test_only_input_errors_are_user_errors() {
        assert!(NeurovoxError::invalid_input("empty").is_user_error());
        assert!(!NeurovoxError::synthesis("boom").is_user_error());
        assert!(!NeurovoxError::model("missing").is_user_error());
    }

    #[test]
    fn test_exhausted_chain_lists_every_attempt() {
        let err = NeurovoxError::ModelsExhausted {
            attempts: vec![
                LoadAttempt {
                    model_id: "xtts_v2".to_string(),
                    reason: "connection refused".to_string(),
                },
                LoadAttempt {
                    model_id: "jenny".to_string(),
                    reason: "no endpoint".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("xtts_v2: connection refused"));
        assert!(text.contains("jenny: no endpoint"));
        assert_eq!(err.category(), "model");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(NeurovoxError::from(io_err), NeurovoxError::FileError { .. }));
    }
}
