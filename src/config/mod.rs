//! Engine configuration
//!
//! Settings that are not part of any one pipeline: logging, parallel execution
//! limits and container I/O defaults.
//!
//! # Location
//!
//! The configuration file is stored in the platform-appropriate config
//! directory:
//! - **Linux**: `~/.config/dev.datagraph.datagraph-rs/engine.toml`
//! - **macOS**: `~/Library/Application Support/dev.datagraph.datagraph-rs/engine.toml`
//! - **Windows**: `%APPDATA%\dev.datagraph.datagraph-rs\engine.toml`
//!
//! # Example
//!
//! ```ignore
//! use datagraph_rs::config::EngineConfig;
//!
//! let mut config = EngineConfig::load_or_default();
//! config.execution.worker_threads = 4;
//! config.save()?;
//! ```

use crate::error::{DataGraphError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.datagraph.datagraph-rs";

/// Config filename
pub const CONFIG_FILE: &str = "engine.toml";

/// Default filter for `tracing-subscriber` when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,datagraph_rs=debug";

/// Default number of elements per parallel work unit
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

// ==================== Config Directory ====================

/// Get the engine config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the engine config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Engine Config ====================

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub execution: ExecutionConfig,
    pub io: IoConfig,
}

impl EngineConfig {
    /// Parse a TOML document; missing sections take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DataGraphError::Config(format!("Failed to parse engine config: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DataGraphError::Config(format!("Failed to serialize engine config: {}", e)))
    }

    /// Load from the default location, defaults when the file does not exist
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            DataGraphError::Config("Could not determine config directory".to_string())
        })?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataGraphError::Config(format!("Failed to read engine config {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load engine config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load engine config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| {
            DataGraphError::Config("Could not determine config directory".to_string())
        })?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataGraphError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            DataGraphError::Config(format!("Failed to write engine config {:?}: {}", path, e))
        })
    }
}

// ==================== Logging Config ====================

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Directory for rolling log files, no file output when unset
    pub log_dir: Option<PathBuf>,

    /// Log file rotation
    pub rotation: LogRotation,

    /// Include ANSI colors in terminal output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
            rotation: LogRotation::Daily,
            ansi: true,
        }
    }
}

/// Log file rotation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl std::fmt::Display for LogRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogRotation::Hourly => write!(f, "hourly"),
            LogRotation::Daily => write!(f, "daily"),
            LogRotation::Never => write!(f, "never"),
        }
    }
}

// ==================== Execution Config ====================

/// Limits for filters that parallelise their own loops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Worker threads, 0 means one per available core
    pub worker_threads: usize,

    /// Elements per work unit
    pub chunk_size: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ExecutionConfig {
    /// Resolve `worker_threads = 0` to the machine's parallelism
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

// ==================== IO Config ====================

/// Container I/O defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// `inspect` reads arrays as placeholders even without `--placeholder`
    pub placeholder_on_inspect: bool,

    /// Format key used when none is given
    pub default_format: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            placeholder_on_inspect: false,
            default_format: crate::io::DEFAULT_FORMAT.to_string(),
        }
    }
}
