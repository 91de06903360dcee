//! Configuration for the trace recorder

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TracefileError};

/// Default number of events buffered before a flush
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Trace recorder configuration
///
/// Resolved once, when the process-wide tracer is created. Changing the
/// environment afterwards has no effect on an already running tracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Whether tracing is enabled at all
    ///
    /// Accepts booleans as well as `1`/`0`, `yes`/`no` and `on`/`off`, the
    /// same spellings the command-line flag accepts from the environment.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub enabled: bool,

    /// File the trace events are written to
    #[serde(default = "default_trace_file")]
    pub file: PathBuf,

    /// Number of events held in memory before they are written out
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_trace_file() -> PathBuf {
    std::env::temp_dir().join("trace.json")
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(1) => Ok(true),
        Flag::Int(0) => Ok(false),
        Flag::Str(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "y" => Ok(true),
            "0" | "false" | "no" | "off" | "n" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean flag `{}`",
                other
            ))),
        },
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean flag `{}`",
            other
        ))),
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: default_trace_file(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl TraceConfig {
    /// Create a builder starting from the defaults
    pub fn builder() -> TraceConfigBuilder {
        TraceConfigBuilder::new()
    }

    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (tracefile.toml or path from TRACEFILE_CONFIG_PATH)
    /// 3. Environment variable overrides (`TRACEFILE_ENABLED`, `TRACEFILE_FILE`,
    ///    `TRACEFILE_BUFFER_SIZE`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or the result
    /// fails validation.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(TraceConfig::default()))
            .merge(Toml::file("tracefile.toml"));

        // Check for custom config path
        if let Ok(path) = std::env::var("TRACEFILE_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: TraceConfig = figment
            .merge(Env::prefixed("TRACEFILE_").ignore(&["config_path"]))
            .extract()
            .map_err(|e| {
                TracefileError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: TraceConfig = Figment::from(Serialized::defaults(TraceConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| {
                TracefileError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer size is zero or the file path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(TracefileError::InvalidCapacity(self.buffer_size));
        }
        if self.file.as_os_str().is_empty() {
            return Err(TracefileError::Configuration(
                "trace file path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for TraceConfig
pub struct TraceConfigBuilder {
    config: TraceConfig,
}

impl TraceConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: TraceConfig::default(),
        }
    }

    /// Enable or disable tracing
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the output file
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.config.file = file.into();
        self
    }

    /// Set the buffer size
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<TraceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TraceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
