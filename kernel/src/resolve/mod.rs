// Version Resolution
//
// Checks a requested version against the versions present in the log
// before any table data is touched.

use crate::version_log::{latest_version, LogError, LogStore, Version};

/// Which snapshot of the table to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelection {
    /// Whatever the table library considers current.
    Latest,

    /// Exactly this version.
    Pinned(Version),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("version {requested} does not exist, max version: {max}")]
    VersionNotFound { requested: Version, max: Version },

    #[error("log scan failed: {0}")]
    Log(#[from] LogError),
}

/// Resolve an optional requested version into a selection.
///
/// No request means the latest snapshot and the log is not scanned.
/// Requests above the highest logged version are rejected; anything
/// else, including negative values, is passed through to the reader.
pub fn resolve_version<S: LogStore>(
    store: &S,
    requested: Option<Version>,
) -> Result<VersionSelection, ResolveError> {
    let Some(requested) = requested else {
        return Ok(VersionSelection::Latest);
    };

    let max = latest_version(store)?;
    if requested > max {
        return Err(ResolveError::VersionNotFound { requested, max });
    }

    Ok(VersionSelection::Pinned(requested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version_log::InMemoryLogStore;

    fn store() -> InMemoryLogStore {
        InMemoryLogStore::from_names(["0.json", "1.json", "12.json"])
    }

    #[test]
    fn no_request_skips_the_scan() {
        // A corrupt log would fail any scan, so success proves none happened.
        let corrupt = InMemoryLogStore::from_names(["garbage"]);

        assert_eq!(
            resolve_version(&corrupt, None).unwrap(),
            VersionSelection::Latest
        );
    }

    #[test]
    fn versions_up_to_max_are_pinned() {
        for v in [0, 1, 5, 12] {
            assert_eq!(
                resolve_version(&store(), Some(v)).unwrap(),
                VersionSelection::Pinned(v)
            );
        }
    }

    #[test]
    fn version_above_max_reports_max() {
        let err = resolve_version(&store(), Some(13)).unwrap_err();

        match err {
            ResolveError::VersionNotFound { requested, max } => {
                assert_eq!(requested, 13);
                assert_eq!(max, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_request_is_passed_through() {
        assert_eq!(
            resolve_version(&store(), Some(-1)).unwrap(),
            VersionSelection::Pinned(-1)
        );
    }

    #[test]
    fn empty_log_with_request_fails() {
        let err = resolve_version(&InMemoryLogStore::default(), Some(0)).unwrap_err();
        assert!(matches!(err, ResolveError::Log(LogError::NoVersions)));
    }
}
