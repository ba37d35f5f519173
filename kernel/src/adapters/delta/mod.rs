// Delta Read Adapter
//
// Opens the bronze table at a resolved version and materializes its
// rows as arrow record batches for display.

use std::fmt;

use deltalake::arrow::record_batch::RecordBatch;
use deltalake::arrow::util::pretty::pretty_format_batches;
use deltalake::operations::collect_sendable_stream;
use deltalake::{DeltaOps, DeltaTableError};

use crate::resolve::VersionSelection;
use crate::version_log::Version;

/// Rows of the table as of one committed version.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub version: Version,
    pub batches: Vec<RecordBatch>,
}

impl TableSnapshot {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

impl fmt::Display for TableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}, rows: {}", self.version, self.num_rows())?;
        let table = pretty_format_batches(&self.batches).map_err(|_| fmt::Error)?;
        write!(f, "{table}")
    }
}

/// Load the table at `table_uri` for the given selection.
pub async fn load_snapshot(
    table_uri: &str,
    selection: VersionSelection,
) -> Result<TableSnapshot, DeltaTableError> {
    let table = match selection {
        VersionSelection::Latest => deltalake::open_table(table_uri).await?,
        VersionSelection::Pinned(version) => {
            deltalake::open_table_with_version(table_uri, version).await?
        }
    };
    let version = table.version();
    log::info!("loaded {table_uri} at version {version}");

    // The scan plan needs at least one file partition.
    if table.get_files_count() == 0 {
        return Ok(TableSnapshot {
            version,
            batches: vec![],
        });
    }

    let (_table, stream) = DeltaOps(table).load().await?;
    let batches = collect_sendable_stream(stream).await?;

    Ok(TableSnapshot { version, batches })
}
