#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::array::{Float64Array, Int64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Write a pipe-delimited subject file with HR, O2Sat, and SepsisLabel
/// columns. HR is observed with periodic gaps, O2Sat is never observed, and
/// the label is 1 on `positive_rows` trailing rows.
pub fn write_subject(dir: &Path, name: &str, rows: usize, positive_rows: usize) -> PathBuf {
    let mut contents = String::from("HR|O2Sat|SepsisLabel\n");
    for row in 0..rows {
        let hr = if row % 7 == 3 {
            String::new()
        } else {
            format!("{}", 60 + row)
        };
        let label = if row >= rows.saturating_sub(positive_rows) {
            "1"
        } else {
            "0"
        };
        contents.push_str(&format!("{hr}||{label}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, contents).expect("write subject file");
    path
}

pub fn write_means(dir: &Path) -> PathBuf {
    let path = dir.join("mean_values.csv");
    fs::write(&path, "HR,O2Sat\n62.1,97.0\n").expect("write means file");
    path
}

pub fn write_config(
    dir: &Path,
    raw_data: &Path,
    prepped_data: &Path,
    min_length: usize,
    write_every: usize,
    npackets: usize,
) -> PathBuf {
    let contents = format!(
        "raw_data: {}\n\
         prepped_data: {}\n\
         data_length:\n  min_length: {min_length}\n\
         write_every: {write_every}\n\
         npackets: {npackets}\n\
         remove_nonkept: true\n\
         kept_columns: [HR, O2Sat, SepsisLabel]\n\
         omitted_columns: []\n\
         imputations:\n  some_nulls: ffill\n  all_nulls: global_mean\n",
        raw_data.display(),
        prepped_data.display()
    );
    let path = dir.join("config.yml");
    fs::write(&path, contents).expect("write config file");
    path
}

/// Everything the tests need to know about a written dataset, read back
/// fragment by fragment in fragment order.
#[derive(Debug)]
pub struct DatasetContents {
    pub fragments: usize,
    pub columns: Vec<String>,
    pub subject_ids: Vec<i64>,
    pub float_columns: BTreeMap<String, Vec<f64>>,
}

impl DatasetContents {
    pub fn rows(&self) -> usize {
        self.subject_ids.len()
    }

    pub fn distinct_subjects(&self) -> Vec<i64> {
        let mut ids = self.subject_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

pub fn read_dataset(dataset: &Path) -> DatasetContents {
    let mut parts: Vec<PathBuf> = fs::read_dir(dataset)
        .expect("list dataset directory")
        .map(|entry| entry.expect("dataset entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    parts.sort();

    let mut columns = Vec::new();
    let mut subject_ids = Vec::new();
    let mut float_columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for part in &parts {
        let file = File::open(part).expect("open fragment");
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .expect("fragment metadata")
            .build()
            .expect("fragment reader");
        for batch in reader {
            let batch = batch.expect("read record batch");
            if columns.is_empty() {
                columns = batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|field| field.name().clone())
                    .collect();
            }
            for (idx, field) in batch.schema().fields().iter().enumerate() {
                if field.name() == "subject_id" {
                    let array = batch
                        .column(idx)
                        .as_any()
                        .downcast_ref::<Int64Array>()
                        .expect("subject_id is Int64");
                    subject_ids.extend(array.values().iter().copied());
                } else {
                    let array = batch
                        .column(idx)
                        .as_any()
                        .downcast_ref::<Float64Array>()
                        .expect("data column is Float64");
                    float_columns
                        .entry(field.name().clone())
                        .or_default()
                        .extend(array.values().iter().copied());
                }
            }
        }
    }

    DatasetContents {
        fragments: parts.len(),
        columns,
        subject_ids,
        float_columns,
    }
}
