//! 16-bit PCM WAV encoding.
//!
//! Audio is written to a per-request temporary file under the output
//! directory and read back into memory. The file is removed when the
//! temporary handle drops, on success and on every error path.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::audio::AudioBuffer;
use crate::error::{NeurovoxError, NeurovoxResult};

/// MIME type of the encoded output
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Platform cache directory for temporary audio, or the system temp dir
#[must_use]
pub fn default_output_dir() -> PathBuf {
    ProjectDirs::from("ai", "Neurovox", "neurovox").map_or_else(
        || std::env::temp_dir().join("neurovox"),
        |dirs| dirs.cache_dir().join("audio"),
    )
}

/// Encodes buffers as mono 16-bit WAV
#[derive(Debug, Clone)]
pub struct WavEncoder {
    output_dir: PathBuf,
}

impl Default for WavEncoder {
    fn default() -> Self {
        Self::new(default_output_dir())
    }
}

impl WavEncoder {
    /// Create an encoder writing temporary files under `output_dir`
    #[must_use]
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory temporary files are written to
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Encode `buffer` and return the complete WAV file
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created, written or
    /// read back.
    pub fn encode(&self, buffer: &AudioBuffer) -> NeurovoxResult<Vec<u8>> {
        self.encode_with(buffer, write_pcm16)
    }

    fn encode_with<F>(&self, buffer: &AudioBuffer, write: F) -> NeurovoxResult<Vec<u8>>
    where
        F: FnOnce(&mut NamedTempFile, &AudioBuffer) -> NeurovoxResult<()>,
    {
        if buffer.sample_rate == 0 {
            return Err(NeurovoxError::audio_processing(
                "Cannot encode audio with a sample rate of 0",
            ));
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            NeurovoxError::file(format!(
                "Failed to create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let mut temp = tempfile::Builder::new()
            .prefix("neurovox-")
            .suffix(".wav")
            .tempfile_in(&self.output_dir)
            .map_err(|e| NeurovoxError::file(format!("Failed to create temporary WAV file: {e}")))?;

        write(&mut temp, buffer)?;
        let bytes = fs::read(temp.path())?;

        debug!(
            path = %temp.path().display(),
            samples = buffer.len(),
            bytes = bytes.len(),
            "Encoded WAV"
        );

        if let Err(e) = temp.close() {
            warn!(error = %e, "Failed to remove temporary WAV file");
        }
        Ok(bytes)
    }
}

fn write_pcm16(temp: &mut NamedTempFile, buffer: &AudioBuffer) -> NeurovoxResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(BufWriter::new(temp.as_file_mut()), spec)?;
    for &sample in &buffer.samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
