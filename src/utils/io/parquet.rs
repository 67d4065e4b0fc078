//! Parquet file operations
//!
//! Thin local-file shell around the Arrow conversions: read input tables,
//! write output tables. Used by the command line tool.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::Result;
use crate::utils::logging::{TableOperation, log_operation_complete, log_operation_start};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Read a whole Parquet file into record batches
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    log_operation_start(TableOperation::Read, path);
    let start = Instant::now();

    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete(TableOperation::Read, path, rows, start.elapsed());
    Ok(batches)
}

/// Write a record batch to a Parquet file, replacing any existing file
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    log_operation_start(TableOperation::Write, path);
    let start = Instant::now();
    let file = File::create(path)?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(properties))?;
    writer.write(batch)?;
    writer.close()?;
    log_operation_complete(TableOperation::Write, path, batch.num_rows(), start.elapsed());
    Ok(())
}
