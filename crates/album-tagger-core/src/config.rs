use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// What to do when `metadata.json` exists but cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorruptSidecarPolicy {
    /// Warn and start from an empty document
    Reset,

    /// Surface the parse failure to the caller
    Fail,
}

/// How a migrated tag set lands on a destination that already has tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileStrategy {
    /// The moved entry replaces whatever the destination had
    Replace,

    /// The moved tags are added to the destination's tags
    Merge,
}

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for scanning and tagging an album
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum directory depth for scanning (root files are depth 1)
    pub max_depth: Option<usize>,

    /// Whether to descend through symbolic links
    pub follow_links: bool,

    /// Behaviour on an unparsable sidecar
    pub corrupt_sidecar: CorruptSidecarPolicy,

    /// Behaviour when a moved entry lands on a path that already has tags
    pub reconcile_strategy: ReconcileStrategy,

    /// Whether to indent the written sidecar
    pub pretty_sidecar: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: None,
            follow_links: false,
            corrupt_sidecar: CorruptSidecarPolicy::Reset,
            reconcile_strategy: ReconcileStrategy::Replace,
            pretty_sidecar: false,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // A depth of zero would only ever visit the root itself
        if self.max_depth == Some(0) {
            return Err(Error::Configuration(
                "max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
