use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, anyhow};

/// Per-column reference means, loaded once at startup from a one-row,
/// column-keyed CSV resource. Read-only for the run's lifetime; consulted
/// when a subject has no observed values at all for a column.
#[derive(Debug, Clone, Default)]
pub struct GlobalMeans {
    values: HashMap<String, f64>,
}

impl GlobalMeans {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Opening means file {path:?}"))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Reading header of means file {path:?}"))?
            .clone();
        let record = reader
            .records()
            .next()
            .ok_or_else(|| anyhow!("Means file {path:?} has no data row"))?
            .with_context(|| format!("Reading means row from {path:?}"))?;

        let mut values = HashMap::with_capacity(headers.len());
        for (name, field) in headers.iter().zip(record.iter()) {
            let mean: f64 = field
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse mean for column '{name}'"))?;
            values.insert(name.trim().to_string(), mean);
        }
        Ok(Self { values })
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for GlobalMeans {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
