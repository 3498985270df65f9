//! Run status polling state machine.
//!
//! [`RunStatusPoller`] never touches a clock or the network. Each operation
//! returns the [`Effect`]s a driver must carry out: arm or disarm a periodic
//! timer, issue a fetch, update the view. Timers and fetches are identified
//! so that late ticks and out-of-order responses can be discarded.

use crate::model::{Run, StartReason, StopReason};
use std::time::Duration;
use tracing::debug;

pub(crate) type TimerId = u64;

/// Shortest polling period the poller will schedule.
pub(crate) const MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollPhase {
    Idle,
    Polling,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollTiming {
    pub interval: Duration,
    pub startup_delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    /// Arm a periodic timer: first tick after `delay`, then every `period`.
    Schedule {
        timer: TimerId,
        job_uid: String,
        delay: Duration,
        period: Duration,
    },
    CancelTimer {
        timer: TimerId,
    },
    Fetch {
        job_uid: String,
        seq: u64,
    },
    Update {
        run: Box<Run>,
    },
    FetchFailed {
        message: String,
    },
    Stopped {
        job_uid: String,
        reason: StopReason,
    },
    /// The newest run finished; reload the completed runs view.
    RefreshCompleted {
        job_uid: String,
    },
}

pub(crate) struct RunStatusPoller {
    timing: PollTiming,
    phase: PollPhase,
    job_uid: Option<String>,
    timer: Option<TimerId>,
    last_timer: TimerId,
    last_seq: u64,
    // Responses with a lower sequence number belong to an earlier session.
    session_first_seq: u64,
    last_applied_seq: Option<u64>,
}

impl RunStatusPoller {
    pub fn new(mut timing: PollTiming) -> Self {
        // Periodic timers cannot have a zero period.
        timing.interval = timing.interval.max(MIN_INTERVAL);
        Self {
            timing,
            phase: PollPhase::Idle,
            job_uid: None,
            timer: None,
            last_timer: 0,
            last_seq: 0,
            session_first_seq: 1,
            last_applied_seq: None,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn active_timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Begin polling `job_uid`. A no-op when that job is already being
    /// polled; any timer for another job is cancelled first.
    pub fn start(&mut self, job_uid: &str, reason: StartReason) -> Vec<Effect> {
        if self.phase == PollPhase::Polling && self.job_uid.as_deref() == Some(job_uid) {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(timer) = self.timer.take() {
            effects.push(Effect::CancelTimer { timer });
        }

        self.last_timer += 1;
        let timer = self.last_timer;
        let delay = match reason {
            StartReason::Observed => self.timing.interval,
            StartReason::Rerun => self.timing.startup_delay,
        };
        debug!(job_uid, ?reason, timer, "start polling");

        self.phase = PollPhase::Polling;
        self.job_uid = Some(job_uid.to_string());
        self.timer = Some(timer);
        self.session_first_seq = self.last_seq + 1;
        self.last_applied_seq = None;

        effects.push(Effect::Schedule {
            timer,
            job_uid: job_uid.to_string(),
            delay,
            period: self.timing.interval,
        });
        effects
    }

    /// Start polling if the newest of the runs a caller just loaded is still
    /// in progress.
    pub fn observe(&mut self, job_uid: &str, runs: &[Run]) -> Vec<Effect> {
        match runs.first() {
            Some(run) if !run.status.is_terminal() => self.start(job_uid, StartReason::Observed),
            _ => Vec::new(),
        }
    }

    pub fn on_tick(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.phase != PollPhase::Polling || self.timer != Some(timer) {
            debug!(timer, "ignoring stale timer tick");
            return Vec::new();
        }
        let Some(job_uid) = self.job_uid.clone() else {
            return Vec::new();
        };
        self.last_seq += 1;
        vec![Effect::Fetch {
            job_uid,
            seq: self.last_seq,
        }]
    }

    /// Apply the outcome of fetch `seq`. Failures keep polling; an empty run
    /// list or a terminal newest run stops it.
    pub fn on_fetch(&mut self, seq: u64, result: Result<Vec<Run>, String>) -> Vec<Effect> {
        let stale = seq < self.session_first_seq
            || self.last_applied_seq.is_some_and(|applied| seq <= applied);
        if self.phase != PollPhase::Polling || stale {
            debug!(seq, "ignoring stale fetch result");
            return Vec::new();
        }
        self.last_applied_seq = Some(seq);

        let runs = match result {
            Ok(runs) => runs,
            Err(message) => return vec![Effect::FetchFailed { message }],
        };
        match runs.into_iter().next() {
            Some(run) if !run.status.is_terminal() => vec![Effect::Update { run: Box::new(run) }],
            Some(run) => self.stop(StopReason::Terminal(run.status)),
            None => self.stop(StopReason::NoRuns),
        }
    }

    /// Stop polling unconditionally.
    pub fn cancel(&mut self) -> Vec<Effect> {
        let was_polling = self.phase == PollPhase::Polling;
        let mut effects = Vec::new();
        if let Some(timer) = self.timer.take() {
            effects.push(Effect::CancelTimer { timer });
        }
        self.phase = PollPhase::Stopped;
        if was_polling {
            if let Some(job_uid) = self.job_uid.clone() {
                effects.push(Effect::Stopped {
                    job_uid,
                    reason: StopReason::Cancelled,
                });
            }
        }
        effects
    }

    fn stop(&mut self, reason: StopReason) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(timer) = self.timer.take() {
            effects.push(Effect::CancelTimer { timer });
        }
        self.phase = PollPhase::Stopped;
        let job_uid = self.job_uid.clone().unwrap_or_default();
        effects.push(Effect::Stopped {
            job_uid: job_uid.clone(),
            reason,
        });
        effects.push(Effect::RefreshCompleted { job_uid });
        effects
    }
}
