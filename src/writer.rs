use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::batch::Batch;
use crate::error::StorageError;

/// Identifier column appended to every output fragment.
pub const SUBJECT_ID_COLUMN: &str = "subject_id";

/// Outcome of destination preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    Ready,
    /// The caller declined to clear a pre-existing destination; nothing was
    /// touched.
    Declined,
}

/// Create the dataset directory, clearing a previous run's output first if
/// the caller confirms. The destructive decision is surfaced through
/// `confirm`; this module never makes it on its own.
pub fn prepare_destination(
    path: &Path,
    confirm: impl FnOnce() -> bool,
) -> Result<Prepared, StorageError> {
    if path.exists() {
        if !confirm() {
            return Ok(Prepared::Declined);
        }
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(Prepared::Ready)
}

/// Append one batch to the dataset as a new Snappy-compressed Parquet
/// fragment. Empty batches are a no-op returning `None`; previously written
/// fragments are never touched.
pub fn flush(
    batch: &Batch,
    dataset: &Path,
    fragment_index: usize,
) -> Result<Option<PathBuf>, StorageError> {
    if batch.is_empty() {
        debug!("Skipping flush of empty batch");
        return Ok(None);
    }

    let record_batch = to_record_batch(batch)?;
    let path = fragment_path(dataset, fragment_index);
    let file = fs::File::create(&path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, record_batch.schema(), Some(props))?;
    writer.write(&record_batch)?;
    writer.close()?;

    info!(
        "Wrote fragment {:?} ({} row(s), {} subject(s))",
        path,
        record_batch.num_rows(),
        batch.len()
    );
    Ok(Some(path))
}

fn fragment_path(dataset: &Path, fragment_index: usize) -> PathBuf {
    dataset.join(format!("part-{fragment_index:05}.parquet"))
}

/// Concatenate the batch into one Arrow record batch: every data column as
/// non-nullable Float64 plus the subject identifier as non-nullable Int64.
/// Callers guarantee the batch is non-empty and all frames share one column
/// layout.
fn to_record_batch(batch: &Batch) -> Result<RecordBatch, StorageError> {
    let frames = batch.frames();
    let columns = &frames[0].columns;
    let total_rows = batch.rows();

    let mut fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Float64, false))
        .collect();
    fields.push(Field::new(SUBJECT_ID_COLUMN, DataType::Int64, false));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len() + 1);
    for idx in 0..columns.len() {
        let mut column = Vec::with_capacity(total_rows);
        for frame in frames {
            column.extend_from_slice(&frame.values[idx]);
        }
        arrays.push(Arc::new(Float64Array::from(column)));
    }
    let mut ids = Vec::with_capacity(total_rows);
    for frame in frames {
        ids.extend(std::iter::repeat_n(frame.subject_id, frame.rows()));
    }
    arrays.push(Arc::new(Int64Array::from(ids)));

    Ok(RecordBatch::try_new(schema, arrays)?)
}
