//! Post-watch processing.
//!
//! Handles auto-save, exports and history pruning once the completed runs of a
//! job have been reloaded.

use crate::model::Run;
use crate::storage::{self, RunStore, MAX_RUNS_PER_JOB};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of post-watch processing, ready for presentation layers.
pub(crate) struct ProcessedRuns {
    pub messages: Vec<String>,
    pub saved: Vec<PathBuf>,
}

/// Persist the newest completed run and write the optional JSON export.
/// Failures become messages; they never abort the watch.
pub(crate) fn process_completed_runs(
    store: Option<&RunStore>,
    export_path: Option<&Path>,
    job_uid: &str,
    runs: &[Run],
) -> ProcessedRuns {
    let mut messages = Vec::new();
    let mut saved = Vec::new();

    if let (Some(store), Some(newest)) = (store, runs.first()) {
        match store.save_run(job_uid, newest) {
            Ok(path) => {
                messages.push(format!("Saved: {}", path.display()));
                saved.push(path);
                if let Err(e) = store.prune(job_uid, MAX_RUNS_PER_JOB) {
                    warn!("pruning saved runs failed: {e:#}");
                }
            }
            Err(e) => messages.push(format!("Save failed: {e:#}")),
        }
    }

    if let Some(path) = export_path {
        match storage::export_json(path, runs) {
            Ok(()) => messages.push(format!("Exported JSON: {}", path.display())),
            Err(e) => messages.push(format!("Export JSON failed: {e:#}")),
        }
    }

    ProcessedRuns { messages, saved }
}
