use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub base_url: String,
    #[serde(skip)]
    pub token: Option<String>,
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Detail view polling period.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Run list polling period.
    #[serde(with = "humantime_serde")]
    pub list_interval: Duration,
    /// Delay before the first status check after a rerun is submitted.
    #[serde(with = "humantime_serde")]
    pub startup_delay: Duration,
    pub auto_save: bool,
    #[serde(default)]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Submitted,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// No further transitions happen once a run or task reaches this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// Whether a task in this state has a result worth showing.
    pub fn has_result(self) -> bool {
        !matches!(
            self,
            RunStatus::Pending | RunStatus::Running | RunStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Submitted => "SUBMITTED",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Elapsed time as reported by the backend: either plain seconds or a
/// `[D day[s], ]H:MM:SS[.ffffff]` clock string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Elapsed {
    Seconds(f64),
    Text(String),
}

impl Elapsed {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Elapsed::Seconds(s) => Duration::try_from_secs_f64(*s).ok(),
            Elapsed::Text(text) => parse_clock(text),
        }
    }
}

fn parse_clock(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (days, clock) = match text.split_once(", ") {
        Some((d, rest)) => (d.split_whitespace().next()?.parse::<u64>().ok()?, rest),
        None => (0, text),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    let secs = match parts.as_slice() {
        [h, m, s] => {
            h.parse::<f64>().ok()? * 3600.0 + m.parse::<f64>().ok()? * 60.0 + s.parse::<f64>().ok()?
        }
        [m, s] => m.parse::<f64>().ok()? * 60.0 + s.parse::<f64>().ok()?,
        [s] => s.parse::<f64>().ok()?,
        _ => return None,
    };
    let days = days.checked_mul(86_400)?;
    Duration::try_from_secs_f64(secs + days as f64).ok()
}

/// Accept strings or numbers and keep them as display text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub uid: String,
    pub name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub duration: Option<Elapsed>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub uid: String,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub duration: Option<Elapsed>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub export_formats: Vec<String>,
    /// GeoJSON geometry of the job's area of interest.
    #[serde(default)]
    pub extent: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartReason {
    /// A non-terminal run was seen while loading the job's runs.
    Observed,
    /// A new run was just requested.
    Rerun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Terminal(RunStatus),
    NoRuns,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PollEvent {
    Started {
        job_uid: String,
    },
    RunUpdated {
        // Boxed to keep the enum small.
        run: Box<Run>,
    },
    FetchFailed {
        message: String,
    },
    Stopped {
        job_uid: String,
        reason: StopReason,
    },
    CompletedRuns {
        job_uid: String,
        runs: Vec<Run>,
    },
    Info(InfoEvent),
}

/// Structured info events emitted by the watcher and consumed by the CLI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    RerunRequested { job_uid: String, run_uid: String },
}

impl InfoEvent {
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::RerunRequested { job_uid, run_uid } => {
                format!("Requested new run {} for job {}", run_uid, job_uid)
            }
        }
    }
}
