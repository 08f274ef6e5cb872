use thiserror::Error;

/// A pipeline setting that failed validation. Raised at configuration load,
/// before any data is read or written.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("configuration: {0}")]
pub struct ConfigError(pub String);

/// Fatal failure while preparing or appending to the dataset. Never retried:
/// previously written fragments remain intact and the run aborts.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Why one subject was excluded from the output. Subject-granular and
/// recoverable: the run logs the reason and continues with the next file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A configured kept column or the label column is absent.
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    /// Row count at or below the configured minimum. A filtering decision,
    /// not a failure.
    #[error("{rows} row(s) is at or below the minimum length {min_length}")]
    TooShort { rows: usize, min_length: usize },
    /// Column layout differs from previously accepted subjects.
    #[error("column layout differs from previously accepted subjects")]
    LayoutMismatch,
}
