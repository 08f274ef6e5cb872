use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::batch::Batch;
use crate::cli::{self, PrepArgs};
use crate::config::Config;
use crate::error::Rejection;
use crate::frame::{self, INPUT_DELIMITER};
use crate::means::GlobalMeans;
use crate::normalize::{self, NormalizedFrame};
use crate::writer::{self, Prepared};

/// Subdirectories of the raw-data root holding training subjects.
const TRAINING_DIR_MARKER: &str = "training_set";

/// Mutable state for one pipeline invocation. Owned by the driver and
/// threaded through the stages explicitly; discarded at process exit.
#[derive(Debug)]
pub struct RunState {
    started: Instant,
    next_subject_id: i64,
    pub fragments: usize,
    pub files_processed: usize,
    expected_layout: Option<Vec<String>>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            next_subject_id: 1,
            fragments: 0,
            files_processed: 0,
            expected_layout: None,
        }
    }

    /// Hand out the next subject identifier. Ids advance for every file
    /// whose table loaded, accepted or not, so one loadable file always
    /// maps to exactly one id.
    fn take_subject_id(&mut self) -> i64 {
        let id = self.next_subject_id;
        self.next_subject_id += 1;
        id
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.started.elapsed().as_secs_f64() / 60.0
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn execute(args: &PrepArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let means = GlobalMeans::load(&args.means)?;
    info!(
        "Running data prep from {:?} with {} global mean(s)",
        config.raw_data,
        means.len()
    );

    let outpath = config.dataset_path();
    let prepared = writer::prepare_destination(&outpath, || {
        if args.yes {
            return true;
        }
        cli::confirm(&format!(
            "Need to remove existing data at {}. Is it ok to proceed?",
            outpath.display()
        ))
    })
    .with_context(|| format!("Preparing dataset destination {outpath:?}"))?;
    if prepared == Prepared::Declined {
        info!("Existing dataset at {outpath:?} left untouched. Exiting.");
        return Ok(());
    }

    let dirs = discover_directories(&config.raw_data)?;
    if dirs.is_empty() {
        warn!(
            "No '{TRAINING_DIR_MARKER}' directories found under {:?}",
            config.raw_data
        );
    }

    let mut state = RunState::new();
    let mut batch = Batch::new(config.write_every);
    for dir in &dirs {
        process_directory(dir, &config, &means, &outpath, &mut state, &mut batch)?;
        info!(
            "Completed {:?} in {:.1} minute(s)",
            dir.file_name().unwrap_or(dir.as_os_str()),
            state.elapsed_minutes()
        );
    }

    info!(
        "Finished: {} file(s) processed, {} fragment(s) written in {:.1} minute(s)",
        state.files_processed,
        state.fragments,
        state.elapsed_minutes()
    );
    Ok(())
}

fn discover_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("Listing raw data root {root:?}"))?;
    let mut dirs: Vec<PathBuf> = entries
        .map_ok(|entry| entry.path())
        .filter_ok(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().contains(TRAINING_DIR_MARKER))
        })
        .try_collect()
        .with_context(|| format!("Reading raw data root {root:?}"))?;
    dirs.sort();
    Ok(dirs)
}

fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Listing directory {dir:?}"))?;
    let mut files: Vec<PathBuf> = entries
        .map_ok(|entry| entry.path())
        .filter_ok(|path| path.is_file())
        .try_collect()
        .with_context(|| format!("Reading directory {dir:?}"))?;
    files.sort();
    Ok(files)
}

/// Process one training directory: load, normalize, accumulate, and flush
/// in strict file order. Load and normalization failures stay at file
/// granularity; only storage failures escalate.
fn process_directory(
    dir: &Path,
    config: &Config,
    means: &GlobalMeans,
    dataset: &Path,
    state: &mut RunState,
    batch: &mut Batch,
) -> Result<()> {
    let files = discover_files(dir)?;
    info!(
        "Working on {:?} ({} file(s))",
        dir.file_name().unwrap_or(dir.as_os_str()),
        files.len()
    );

    for (file_index, path) in files.iter().enumerate() {
        if state.fragments >= config.npackets {
            info!(
                "Reached fragment limit ({}); skipping the rest of {:?}",
                config.npackets,
                dir.file_name().unwrap_or(dir.as_os_str())
            );
            break;
        }

        match frame::load_frame(path, INPUT_DELIMITER) {
            Ok(raw) => {
                state.files_processed += 1;
                let subject_id = state.take_subject_id();
                match normalize::normalize(&raw, config, means, subject_id) {
                    Ok(normalized) => accept(normalized, state, batch, path),
                    Err(rejection) => {
                        warn!("Rejected subject {subject_id} from {path:?}: {rejection}");
                    }
                }
            }
            Err(err) => warn!("Skipping unreadable subject file {path:?}: {err:#}"),
        }

        if batch.should_flush(file_index, file_index + 1 == files.len()) {
            if writer::flush(batch, dataset, state.fragments)
                .with_context(|| format!("Fatal storage failure appending to {dataset:?}"))?
                .is_some()
            {
                state.fragments += 1;
            }
            batch.reset();
        }
    }
    Ok(())
}

/// Admit a normalized subject to the batch, holding every accepted subject
/// to the column layout of the first one so each fragment shares a schema.
fn accept(normalized: NormalizedFrame, state: &mut RunState, batch: &mut Batch, path: &Path) {
    match &state.expected_layout {
        Some(layout) if *layout != normalized.columns => {
            warn!(
                "Rejected subject {} from {path:?}: {}",
                normalized.subject_id,
                Rejection::LayoutMismatch
            );
        }
        _ => {
            if state.expected_layout.is_none() {
                state.expected_layout = Some(normalized.columns.clone());
            }
            debug!(
                "Accepted subject {} ({} row(s))",
                normalized.subject_id,
                normalized.rows()
            );
            batch.push(normalized);
        }
    }
}
