use std::path::Path;

use anyhow::{Context, Result};

/// Delimiter of the raw per-subject input files.
pub const INPUT_DELIMITER: u8 = b'|';

/// One subject's raw time-series table: ordered column names plus
/// column-major values, `None` where the source cell was empty or NaN.
/// Ephemeral; exists only while one subject is normalized.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl RawFrame {
    pub fn rows(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Load one subject file into a [`RawFrame`]. Every row must have exactly
/// as many fields as the header; a malformed file is an error the caller
/// handles at file granularity.
pub fn load_frame(path: &Path, delimiter: u8) -> Result<RawFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("Opening subject file {path:?}"))?;
    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Reading header of {path:?}"))?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut values = vec![Vec::new(); columns.len()];
    for (ordinal, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Reading row {} of {path:?}", ordinal + 2))?;
        for (idx, field) in record.iter().enumerate() {
            let cell =
                parse_cell(field).with_context(|| format!("Row {} of {path:?}", ordinal + 2))?;
            values[idx].push(cell);
        }
    }
    Ok(RawFrame { columns, values })
}

/// Empty cells and explicit NaN markers are nulls; anything else must parse
/// as a number.
fn parse_cell(field: &str) -> Result<Option<f64>> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Failed to parse '{trimmed}' as float"))?;
    Ok(Some(parsed))
}
