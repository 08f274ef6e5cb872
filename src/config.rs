use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;

/// Directory name of the columnar dataset under `prepped_data`.
pub const DATASET_NAME: &str = "physionet_data.parquet";

/// Strategy for columns with some, but not all, observations missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomeNulls {
    Ffill,
    LinearInterpolate,
}

/// Strategy for columns with no observations at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllNulls {
    GlobalMean,
    Zero,
}

/// The column-wise null-filling policy. Loaded once, immutable for the run.
/// Unrecognized option values fail deserialization, so a bad policy aborts
/// before any file is read.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImputePolicy {
    pub some_nulls: SomeNulls,
    pub all_nulls: AllNulls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataLength {
    /// Subjects with this many rows or fewer are excluded from the output.
    pub min_length: usize,
}

/// Declarative pipeline configuration, deserialized from YAML and validated
/// eagerly at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory holding the raw training-set subdirectories.
    pub raw_data: PathBuf,
    /// Root directory the columnar dataset is written under.
    pub prepped_data: PathBuf,
    pub data_length: DataLength,
    /// Flush cadence: a flush is attempted after every file whose 0-based
    /// enumeration index is a multiple of this.
    pub write_every: usize,
    /// Maximum number of fragments to write before stopping a directory.
    pub npackets: usize,
    /// When set, project every subject to exactly `kept_columns`.
    pub remove_nonkept: bool,
    #[serde(default)]
    pub kept_columns: Vec<String>,
    #[serde(default)]
    pub omitted_columns: Vec<String>,
    pub imputations: ImputePolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Loading config from {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(raw).map_err(|err| ConfigError(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.write_every == 0 {
            return Err(ConfigError("write_every must be at least 1".into()));
        }
        if self.npackets == 0 {
            return Err(ConfigError("npackets must be at least 1".into()));
        }
        if self.remove_nonkept && self.kept_columns.is_empty() {
            return Err(ConfigError(
                "remove_nonkept requires a non-empty kept_columns list".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the dataset directory fragments are appended under.
    pub fn dataset_path(&self) -> PathBuf {
        self.prepped_data.join(DATASET_NAME)
    }
}
