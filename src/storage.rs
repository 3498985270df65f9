//! Local history of finished runs.
//!
//! Runs are stored one JSON file per run under `<root>/<job_uid>/<run_uid>.json`.

use crate::model::Run;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Runs kept per job; older ones are pruned after each save.
pub const MAX_RUNS_PER_JOB: usize = 5;

pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_DATA_HOME/hot-export-cli/runs` or the platform equivalent.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_local_dir().context("no local data directory on this platform")?;
        Ok(Self::new(base.join("hot-export-cli").join("runs")))
    }

    fn job_dir(&self, job_uid: &str) -> PathBuf {
        self.root.join(file_stem(job_uid))
    }

    pub fn save_run(&self, job_uid: &str, run: &Run) -> Result<PathBuf> {
        let dir = self.job_dir(job_uid);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(format!("{}.json", file_stem(&run.uid)));
        let data = serde_json::to_vec_pretty(run)?;
        fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Up to `limit` saved runs of a job, newest first. Unreadable files are skipped.
    pub fn load_recent(&self, job_uid: &str, limit: usize) -> Result<Vec<Run>> {
        let mut runs = self.load_all(job_uid)?;
        runs.truncate(limit);
        Ok(runs.into_iter().map(|(_, run)| run).collect())
    }

    /// Delete all but the `keep` newest runs of a job. Returns how many were removed.
    pub fn prune(&self, job_uid: &str, keep: usize) -> Result<usize> {
        let runs = self.load_all(job_uid)?;
        let mut removed = 0;
        for (path, _) in runs.into_iter().skip(keep) {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }

    fn load_all(&self, job_uid: &str) -> Result<Vec<(PathBuf, Run)>> {
        let dir = self.job_dir(job_uid);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(data) = fs::read(&path) else { continue };
            if let Ok(run) = serde_json::from_slice::<Run>(&data) {
                runs.push((path, run));
            }
        }
        // RFC 3339 timestamps sort lexically; runs without one go last.
        runs.sort_by(|(_, a), (_, b)| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.uid.cmp(&a.uid))
        });
        Ok(runs)
    }
}

/// Write `runs` as a pretty-printed JSON array.
pub fn export_json(path: &Path, runs: &[Run]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let data = serde_json::to_vec_pretty(runs)?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]`, so distinct uids never
/// share a file name.
fn file_stem(uid: &str) -> String {
    let mut out = String::with_capacity(uid.len());
    for b in uid.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
