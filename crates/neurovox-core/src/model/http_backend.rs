// Acoustic models served by a Coqui-style TTS server.
//
// Each catalog model lives behind its own endpoint answering
// `GET /api/tts?text=..&speaker_id=..&language_id=..&style_wav=` with a WAV body.
// The client is blocking; callers run synthesis on a blocking thread.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use super::{AcousticModel, Conditioning, ModelInfo, ModelLoader, RawAudio};
use crate::error::{NeurovoxError, NeurovoxResult};

/// Default per-request timeout; long texts on CPU can take minutes
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Model reached over HTTP
#[derive(Debug)]
pub struct HttpAcousticModel {
    info: &'static ModelInfo,
    endpoint: String,
    client: Client,
    reentrant: bool,
}

impl AcousticModel for HttpAcousticModel {
    fn info(&self) -> &'static ModelInfo {
        self.info
    }

    fn synthesize(&self, text: &str, conditioning: &Conditioning) -> NeurovoxResult<RawAudio> {
        let url = format!("{}/api/tts", self.endpoint);
        let speaker = conditioning.speaker.as_deref().unwrap_or("");
        let language = conditioning.language.as_deref().unwrap_or("");

        debug!(
            model = self.info.id,
            chars = text.len(),
            speaker,
            language,
            "Requesting synthesis from model server"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("text", text),
                ("speaker_id", speaker),
                ("language_id", language),
                ("style_wav", ""),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NeurovoxError::synthesis(format!(
                "Model server {} returned {status}: {body}",
                self.info.id
            )));
        }

        let bytes = response.bytes()?;
        decode_wav(&bytes)
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }
}

/// Loads models by probing their configured endpoints
#[derive(Debug, Clone)]
pub struct HttpModelLoader {
    endpoints: BTreeMap<String, String>,
    timeout: Duration,
    reentrant: bool,
}

impl HttpModelLoader {
    /// Create a loader from model id → endpoint URL pairs
    #[must_use]
    pub fn new(endpoints: BTreeMap<String, String>) -> Self {
        Self {
            endpoints,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            reentrant: false,
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Declare the model servers safe for concurrent requests
    #[must_use]
    pub fn with_reentrant(mut self, reentrant: bool) -> Self {
        self.reentrant = reentrant;
        self
    }
}

impl ModelLoader for HttpModelLoader {
    fn load(&self, info: &'static ModelInfo) -> NeurovoxResult<Box<dyn AcousticModel>> {
        let endpoint = self
            .endpoints
            .get(info.id)
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| NeurovoxError::model(format!("No endpoint configured for '{}'", info.id)))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| NeurovoxError::model(format!("Failed to build HTTP client: {e}")))?;

        // The server must answer before the model counts as loaded.
        let probe = client
            .get(format!("{endpoint}/"))
            .send()
            .map_err(|e| NeurovoxError::model(format!("{} unreachable at {endpoint}: {e}", info.id)))?;
        if !probe.status().is_success() {
            return Err(NeurovoxError::model(format!(
                "{} at {endpoint} answered {}",
                info.id,
                probe.status()
            )));
        }

        info!(model = info.id, %endpoint, "Model server is ready");
        Ok(Box::new(HttpAcousticModel {
            info,
            endpoint,
            client,
            reentrant: self.reentrant,
        }))
    }
}

/// Decode a WAV body into mono f32 samples
///
/// # Errors
///
/// Returns an error if the body is not a readable WAV stream.
pub fn decode_wav(bytes: &[u8]) -> NeurovoxResult<RawAudio> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(RawAudio {
        samples,
        sample_rate: Some(spec.sample_rate),
    })
}
