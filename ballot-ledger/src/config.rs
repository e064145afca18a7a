//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the entry store
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Validation configuration
    pub validation: ValidationConfig,

    /// RocksDB configuration
    pub rocksdb: RocksDbConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ballot-ledger"),
            service_name: "ballot-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            validation: ValidationConfig::default(),
            rocksdb: RocksDbConfig::default(),
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Recompute content digests during validation, in addition to the
    /// predecessor link checks. Disabling this leaves payload tampering
    /// within an entry undetected.
    pub verify_digests: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            verify_digests: true,
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 2,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("BALLOT_LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(verify) = std::env::var("BALLOT_LEDGER_VERIFY_DIGESTS") {
            config.validation.verify_digests = verify
                .parse()
                .map_err(|_| crate::Error::Config(format!(
                    "BALLOT_LEDGER_VERIFY_DIGESTS must be true or false, got {verify}"
                )))?;
        }

        Ok(config)
    }
}
