// Versioned Table Read
//
// Runs the read path end to end:
// requested version → log scan → resolution → snapshot load

use deltalake::DeltaTableError;

use crate::adapters::delta::{load_snapshot, TableSnapshot};
use crate::config::LakeConfig;
use crate::resolve::{resolve_version, ResolveError};
use crate::version_log::{FsLogStore, Version};

/// Errors that can occur while reading the table.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("version resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("table read failed: {0}")]
    Table(#[from] DeltaTableError),
}

impl ReadError {
    /// The highest available version, if the request was above it.
    pub fn version_not_found(&self) -> Option<Version> {
        match self {
            ReadError::Resolve(ResolveError::VersionNotFound { max, .. }) => Some(*max),
            _ => None,
        }
    }

    pub fn is_version_not_found(&self) -> bool {
        self.version_not_found().is_some()
    }
}

/// Load the table at `requested`, or at its latest version when `None`.
///
/// A request above the highest logged version fails before any table
/// data is read.
pub async fn read_table(
    config: &LakeConfig,
    requested: Option<Version>,
) -> Result<TableSnapshot, ReadError> {
    let store = FsLogStore::new(config.log_dir());
    let selection = resolve_version(&store, requested)?;
    log::debug!("resolved {requested:?} to {selection:?}");

    let snapshot = load_snapshot(&config.table_uri(), selection).await?;
    Ok(snapshot)
}
