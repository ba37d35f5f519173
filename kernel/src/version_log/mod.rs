// Version Log Scanning
//
// Derives the space of committed table versions from the file names
// in a table's `_delta_log` directory.

mod store;

pub use store::{FsLogStore, InMemoryLogStore, LogStore};

/// Logical version of a table.
pub type Version = i64;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("no versions found in log directory")]
    NoVersions,

    #[error("corrupt version log entry: `{name}` does not start with a version number")]
    CorruptLogEntry { name: String },

    #[error("failed to list log directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse the version encoded in a log file name.
///
/// The version is everything before the first `.`, so `00000000000000000012.json`
/// and `12.checkpoint.parquet` both yield 12.
pub fn parse_version(name: &str) -> Result<Version, LogError> {
    let prefix = name.split('.').next().unwrap_or(name);
    prefix
        .parse::<Version>()
        .map_err(|_| LogError::CorruptLogEntry {
            name: name.to_string(),
        })
}

/// Highest version present in the log.
///
/// Every entry must parse; a single malformed name fails the scan.
pub fn latest_version<S: LogStore>(store: &S) -> Result<Version, LogError> {
    let mut max: Option<Version> = None;

    for name in store.entries()? {
        let version = parse_version(&name)?;
        max = Some(max.map_or(version, |m| m.max(version)));
    }

    let max = max.ok_or(LogError::NoVersions)?;
    log::debug!("latest version in log: {max}");
    Ok(max)
}
