use crate::config::Config;
use crate::error::Rejection;
use crate::frame::RawFrame;
use crate::impute::impute;
use crate::means::GlobalMeans;

/// Per-timestep label column present in every subject file.
pub const LABEL_COLUMN: &str = "SepsisLabel";
/// Derived whole-stay outcome column added to every subject.
pub const OUTCOME_COLUMN: &str = "SepsisEver";
/// A subject is flagged positive once its summed labels exceed this.
const OUTCOME_THRESHOLD: f64 = 0.9;

/// One subject after filtering and imputation: null-free columns (ending
/// with the derived outcome) plus the assigned subject identifier, ready to
/// batch.
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    pub subject_id: i64,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl NormalizedFrame {
    pub fn rows(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

/// Turn one raw subject table into a null-free [`NormalizedFrame`]:
/// allow-list projection, omission, per-column imputation, outcome
/// derivation, and length filtering. Every failure is a subject-granular
/// [`Rejection`]; the caller decides how to log and continue.
pub fn normalize(
    raw: &RawFrame,
    config: &Config,
    means: &GlobalMeans,
    subject_id: i64,
) -> Result<NormalizedFrame, Rejection> {
    let selected: Vec<(&str, &[Option<f64>])> =
        if config.remove_nonkept && !config.kept_columns.is_empty() {
            config
                .kept_columns
                .iter()
                .map(|name| {
                    raw.column_index(name)
                        .map(|idx| (name.as_str(), raw.values[idx].as_slice()))
                        .ok_or_else(|| Rejection::MissingColumn(name.clone()))
                })
                .collect::<Result<_, _>>()?
        } else {
            raw.columns
                .iter()
                .zip(raw.values.iter())
                .map(|(name, column)| (name.as_str(), column.as_slice()))
                .collect()
        };

    let mut columns = Vec::with_capacity(selected.len() + 1);
    let mut values = Vec::with_capacity(selected.len() + 1);
    for (name, column) in selected {
        if config.omitted_columns.iter().any(|omitted| omitted == name) {
            continue;
        }
        values.push(impute(column, name, config.imputations, means));
        columns.push(name.to_string());
    }

    let label_idx = columns
        .iter()
        .position(|name| name == LABEL_COLUMN)
        .ok_or_else(|| Rejection::MissingColumn(LABEL_COLUMN.to_string()))?;
    let label_sum: f64 = values[label_idx].iter().sum();
    let outcome = if label_sum > OUTCOME_THRESHOLD { 1.0 } else { 0.0 };

    let rows = raw.rows();
    if rows <= config.data_length.min_length {
        return Err(Rejection::TooShort {
            rows,
            min_length: config.data_length.min_length,
        });
    }

    columns.push(OUTCOME_COLUMN.to_string());
    values.push(vec![outcome; rows]);

    Ok(NormalizedFrame {
        subject_id,
        columns,
        values,
    })
}
