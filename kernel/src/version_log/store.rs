// Version Log Listing
//
// Abstracts where log file names come from so version resolution
// can run against a real directory or a fixed list in tests.

use std::fs;
use std::path::PathBuf;

use super::LogError;

/// Source of log file names.
///
/// Implementations return the bare file names (no directory component)
/// of regular files directly inside the log directory, in any order.
pub trait LogStore {
    fn entries(&self) -> Result<Vec<String>, LogError>;
}

/// Lists a `_delta_log` directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLogStore {
    dir: PathBuf,
}

impl FsLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogStore for FsLogStore {
    fn entries(&self) -> Result<Vec<String>, LogError> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            // Follows symlinks, subdirectories are skipped.
            if !entry.path().is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        log::debug!("listed {} entries in {}", names.len(), self.dir.display());
        Ok(names)
    }
}

/// Fixed list of names, for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLogStore {
    names: Vec<String>,
}

impl InMemoryLogStore {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl LogStore for InMemoryLogStore {
    fn entries(&self) -> Result<Vec<String>, LogError> {
        Ok(self.names.clone())
    }
}
