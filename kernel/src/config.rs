// Lake Configuration
//
// Locations of the bronze table and the generated source feeds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_TABLE_PATH: &str = "delta/source_table_bronze";
const DEFAULT_SOURCE_DATA_DIR: &str = "source_data";
const LOG_DIR_NAME: &str = "_delta_log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Paths used by every operation, loaded from JSON or defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    /// Root of the versioned table.
    pub table_path: PathBuf,

    /// Directory that holds `feed_{n}.parquet` files.
    pub source_data_dir: PathBuf,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            source_data_dir: PathBuf::from(DEFAULT_SOURCE_DATA_DIR),
        }
    }
}

impl LakeConfig {
    /// Config rooted at `base`, keeping the default relative layout.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            table_path: base.join(DEFAULT_TABLE_PATH),
            source_data_dir: base.join(DEFAULT_SOURCE_DATA_DIR),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory holding one file per committed version.
    pub fn log_dir(&self) -> PathBuf {
        self.table_path.join(LOG_DIR_NAME)
    }

    pub fn feed_path(&self, feed_number: i32) -> PathBuf {
        self.source_data_dir.join(format!("feed_{feed_number}.parquet"))
    }

    /// Table location as the string URI the table library expects.
    pub fn table_uri(&self) -> String {
        self.table_path.to_string_lossy().into_owned()
    }
}
