// Source Feed Fixtures
//
// Deterministic two-row datasets standing in for successive source
// batches. Each feed number yields different ids, names and amounts.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use deltalake::arrow::array::{ArrayRef, Int32Array, StringArray};
use deltalake::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use deltalake::arrow::error::ArrowError;
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::arrow::util::pretty::pretty_format_batches;
use deltalake::parquet::arrow::ArrowWriter;
use deltalake::parquet::errors::ParquetError;

use crate::config::LakeConfig;

const BASE_IDS: [i32; 2] = [1, 2];
const BASE_NAMES: [&str; 2] = ["nice", "bad"];
const BASE_AMOUNTS: [i32; 2] = [100, 123];

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("feed number {0} overflows the generated columns")]
    FeedOutOfRange(i32),

    #[error("failed to build record batch: {0}")]
    Arrow(#[from] ArrowError),

    #[error("failed to write parquet: {0}")]
    Parquet(#[from] ParquetError),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Schema shared by every feed file.
pub fn feed_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("amount", DataType::Int32, false),
    ]))
}

/// The rows of one feed, column by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecords {
    pub feed_number: i32,
    pub id: Vec<i32>,
    pub name: Vec<String>,
    pub amount: Vec<i32>,
}

impl FeedRecords {
    /// Build the rows for `feed_number`.
    ///
    /// Ids shift by `2 * (feed_number - 1)`, names gain a `-{feed_number}`
    /// suffix and amounts scale by `feed_number`. Zero and negative feeds
    /// are accepted.
    pub fn for_feed(feed_number: i32) -> Result<Self, FixtureError> {
        let out_of_range = || FixtureError::FeedOutOfRange(feed_number);

        let increment = feed_number
            .checked_sub(1)
            .and_then(|n| n.checked_mul(2))
            .ok_or_else(out_of_range)?;

        let id = BASE_IDS
            .iter()
            .map(|i| i.checked_add(increment))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(out_of_range)?;

        let amount = BASE_AMOUNTS
            .iter()
            .map(|a| a.checked_mul(feed_number))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(out_of_range)?;

        let name = BASE_NAMES
            .iter()
            .map(|n| format!("{n}-{feed_number}"))
            .collect();

        Ok(Self {
            feed_number,
            id,
            name,
            amount,
        })
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(self.id.clone())),
            Arc::new(StringArray::from(self.name.clone())),
            Arc::new(Int32Array::from(self.amount.clone())),
        ];
        RecordBatch::try_new(feed_schema(), columns)
    }
}

impl fmt::Display for FeedRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{table}")
    }
}

/// A feed that has been written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedFeed {
    pub path: PathBuf,
    pub records: FeedRecords,
}

/// Generate feed `feed_number` and write it under the source data directory.
///
/// An existing file is overwritten. The directory itself must already exist.
pub fn create_table(
    config: &LakeConfig,
    feed_number: i32,
) -> Result<GeneratedFeed, FixtureError> {
    let records = FeedRecords::for_feed(feed_number)?;
    let batch = records.to_record_batch()?;
    let path = config.feed_path(feed_number);

    let file = File::create(&path).map_err(|source| FixtureError::Io {
        path: path.clone(),
        source,
    })?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    log::info!("wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(GeneratedFeed { path, records })
}
