// Feed Ingestion
//
// Appends a generated feed file to the bronze table, creating the table
// on first use. Each ingest commits exactly one new version.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field, Schema, SchemaRef};
use deltalake::arrow::error::ArrowError;
use deltalake::arrow::record_batch::RecordBatch;
use deltalake::datafusion::error::DataFusionError;
use deltalake::datafusion::execution::context::SessionContext;
use deltalake::datafusion::execution::options::ParquetReadOptions;
use deltalake::datafusion::logical_expr::{cast, col, lit};
use deltalake::kernel::{DataType, PrimitiveType, StructField};
use deltalake::parquet::basic::{Compression, ZstdLevel};
use deltalake::parquet::errors::ParquetError;
use deltalake::parquet::file::properties::WriterProperties;
use deltalake::writer::{DeltaWriter, RecordBatchWriter};
use deltalake::{DeltaOps, DeltaTable, DeltaTableError};

use crate::config::LakeConfig;
use crate::fixture::feed_schema;
use crate::version_log::Version;

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("feed file {0} does not exist")]
    MissingFeed(PathBuf),

    #[error("table error: {0}")]
    Table(#[from] DeltaTableError),

    #[error("query error: {0}")]
    Query(#[from] DataFusionError),

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub feed_path: PathBuf,
    pub version: Version,
    pub rows: usize,
}

/// Columns of the bronze table.
pub fn bronze_columns() -> Vec<StructField> {
    vec![
        StructField::new("id", DataType::Primitive(PrimitiveType::Integer), false),
        StructField::new("name", DataType::Primitive(PrimitiveType::String), false),
        StructField::new("amount", DataType::Primitive(PrimitiveType::Integer), false),
        StructField::new(
            "half_amount",
            DataType::Primitive(PrimitiveType::Integer),
            false,
        ),
    ]
}

fn bronze_arrow_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", ArrowDataType::Int32, false),
        Field::new("name", ArrowDataType::Utf8, false),
        Field::new("amount", ArrowDataType::Int32, false),
        Field::new("half_amount", ArrowDataType::Int32, false),
    ]))
}

/// Open the table, creating it with the bronze columns if nothing is there yet.
pub async fn open_or_create_table(table_uri: &str) -> Result<DeltaTable, DeltaTableError> {
    match deltalake::open_table(table_uri).await {
        Ok(table) => Ok(table),
        Err(DeltaTableError::InvalidTableLocation(_)) | Err(DeltaTableError::NotATable(_)) => {
            log::info!("creating table at {table_uri}");
            DeltaOps::try_from_uri(table_uri)
                .await?
                .create()
                .with_columns(bronze_columns())
                .await
        }
        Err(err) => Err(err),
    }
}

/// Read a feed file and derive `half_amount = amount / 2`.
pub async fn read_feed(path: &Path) -> Result<Vec<RecordBatch>, IngestError> {
    if !path.is_file() {
        return Err(IngestError::MissingFeed(path.to_path_buf()));
    }

    let schema = feed_schema();
    let mut options = ParquetReadOptions::default();
    options.schema = Some(schema.as_ref());

    let uri = path.to_string_lossy().into_owned();
    let ctx = SessionContext::new();
    let df = ctx
        .read_parquet(uri.as_str(), options)
        .await?
        .with_column(
            "half_amount",
            cast(col("amount") / lit(2), ArrowDataType::Int32),
        )?;

    let target = bronze_arrow_schema();
    df.collect()
        .await?
        .into_iter()
        .map(|batch| RecordBatch::try_new(target.clone(), batch.columns().to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(IngestError::from)
}

/// Append feed `feed_number` to the table as one new version.
pub async fn ingest_feed(
    config: &LakeConfig,
    feed_number: i32,
) -> Result<IngestReport, IngestError> {
    let feed_path = config.feed_path(feed_number);
    let batches = read_feed(&feed_path).await?;
    let rows = batches.iter().map(RecordBatch::num_rows).sum();

    let mut table = open_or_create_table(&config.table_uri()).await?;

    let writer_properties = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(ZSTD_LEVEL)?))
        .build();
    let mut writer =
        RecordBatchWriter::for_table(&table)?.with_writer_properties(writer_properties);

    for batch in batches {
        writer.write(batch).await?;
    }

    let version = writer.flush_and_commit(&mut table).await?;
    log::info!(
        "committed {rows} rows from {} as version {version}",
        feed_path.display()
    );

    Ok(IngestReport {
        feed_path,
        version,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use deltalake::arrow::array::AsArray;
    use deltalake::arrow::datatypes::Int32Type;

    use crate::fixture::create_table;

    fn lake() -> (tempfile::TempDir, LakeConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = LakeConfig::rooted_at(dir.path());
        fs::create_dir_all(&config.source_data_dir).unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn feed_gains_half_amount() {
        let (_dir, config) = lake();
        create_table(&config, 1).unwrap();

        let batches = read_feed(&config.feed_path(1)).await.unwrap();
        let half: Vec<i32> = batches
            .iter()
            .flat_map(|b| {
                b.column_by_name("half_amount")
                    .unwrap()
                    .as_primitive::<Int32Type>()
                    .values()
                    .to_vec()
            })
            .collect();

        assert_eq!(half, vec![50, 61]);
        assert_eq!(batches[0].schema(), bronze_arrow_schema());
    }

    #[tokio::test]
    async fn missing_feed_is_reported() {
        let (_dir, config) = lake();

        let err = ingest_feed(&config, 7).await.unwrap_err();
        assert!(matches!(err, IngestError::MissingFeed(p) if p == config.feed_path(7)));
    }

    #[tokio::test]
    async fn first_ingest_creates_table_then_appends() {
        let (_dir, config) = lake();
        create_table(&config, 1).unwrap();
        create_table(&config, 2).unwrap();

        let first = ingest_feed(&config, 1).await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.rows, 2);

        let second = ingest_feed(&config, 2).await.unwrap();
        assert_eq!(second.version, 2);
        assert!(config.log_dir().join("00000000000000000002.json").is_file());
    }
}
