//! Application-level orchestration.
//!
//! Owns the run status polling state machine, the tokio driver that runs it
//! against the backend, and post-watch processing such as auto-save and
//! exports. CLI layers call into this module to keep responsibilities separated.

mod controller;
mod poller;
mod post_process;

pub(crate) use controller::{run_watch, Kickoff, WatchCommand};
pub(crate) use poller::PollTiming;
pub(crate) use post_process::process_completed_runs;
