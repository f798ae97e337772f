//! Server configuration.
//!
//! Values come from an optional TOML file, then command line flags and
//! `NEUROVOX_*` environment variables on top.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use neurovox_core::wav::default_output_dir;
use neurovox_core::{TtsDevice, DEFAULT_TARGET_SAMPLE_RATE};
use serde::{Deserialize, Serialize};

use crate::ServerError;

/// Command line arguments
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "neurovox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Neurovox - neural text-to-speech over HTTP")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, short, env = "NEUROVOX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "NEUROVOX_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long, short, env = "NEUROVOX_PORT")]
    pub port: Option<u16>,

    /// Log level or filter directive
    #[arg(long = "log-level", env = "NEUROVOX_LOG", value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5004,
        }
    }
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Device reported to clients
    pub device: TtsDevice,
    /// Skip the synthesis gate; only for model servers that handle parallel requests
    pub concurrent_synthesis: bool,
    /// Per-request timeout towards the model servers
    pub request_timeout_secs: u64,
    /// Output sample rate after enhancement
    pub target_sample_rate: u32,
    /// Where temporary WAV files are written
    pub output_dir: Option<PathBuf>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            device: TtsDevice::Cpu,
            concurrent_synthesis: false,
            request_timeout_secs: 180,
            target_sample_rate: DEFAULT_TARGET_SAMPLE_RATE,
            output_dir: None,
        }
    }
}

impl EngineSection {
    /// Model server request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured output directory or the platform cache directory
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level or `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn default_model_endpoints() -> BTreeMap<String, String> {
    [
        ("xtts_v2", "http://127.0.0.1:5020"),
        ("vctk_p239", "http://127.0.0.1:5021"),
        ("jenny", "http://127.0.0.1:5022"),
    ]
    .into_iter()
    .map(|(id, url)| (id.to_string(), url.to_string()))
    .collect()
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind settings
    pub server: ServerSection,
    /// Synthesis settings
    pub engine: EngineSection,
    /// Model id to model server endpoint
    pub models: BTreeMap<String, String>,
    /// Log output settings
    pub logging: LoggingSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            engine: EngineSection::default(),
            models: default_model_endpoints(),
            logging: LoggingSection::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid configuration TOML.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(format!("Invalid configuration: {e}")))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Build the effective configuration from command line arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or the result is invalid.
    pub fn load(args: &Args) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Overlay flags and environment variables
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(level) = &args.log_level {
            self.logging.level.clone_from(level);
        }
    }

    /// Check values that would only fail later at runtime
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.server.host.trim().is_empty() {
            return Err(ServerError::Config("server.host must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(ServerError::Config("server.port must not be 0".to_string()));
        }
        if !(8_000..=192_000).contains(&self.engine.target_sample_rate) {
            return Err(ServerError::Config(format!(
                "engine.target_sample_rate must be between 8000 and 192000, got {}",
                self.engine.target_sample_rate
            )));
        }
        if self.engine.request_timeout_secs == 0 {
            return Err(ServerError::Config(
                "engine.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.models.is_empty() {
            return Err(ServerError::Config("[models] lists no model endpoints".to_string()));
        }
        Ok(())
    }
}
