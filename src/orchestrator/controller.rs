//! Polling driver.
//!
//! Runs a [`RunStatusPoller`] against a live [`RunSource`] on tokio timers and
//! forwards what it observes as [`PollEvent`]s for presentation layers.

use super::poller::{Effect, PollPhase, PollTiming, RunStatusPoller, TimerId};
use crate::api::RunSource;
use crate::model::{InfoEvent, PollEvent, Run, StartReason, StopReason};
use anyhow::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Commands emitted by the CLI layer while a watch is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchCommand {
    /// Stop polling and report the watch as cancelled.
    Cancel,
    Quit,
}

/// How a watch begins.
#[derive(Debug, Clone)]
pub(crate) enum Kickoff {
    /// Runs already loaded by the caller, newest first.
    Observe(Vec<Run>),
    /// Request a new run, then follow it.
    Rerun,
}

/// The armed periodic timer, if any.
type ActiveTimer = Option<(TimerId, Interval)>;

async fn next_tick(timer: &mut ActiveTimer) -> TimerId {
    match timer {
        Some((id, interval)) => {
            interval.tick().await;
            *id
        }
        None => futures::future::pending().await,
    }
}

/// Follow the runs of `job_uid` until polling stops, the command channel
/// closes, or [`WatchCommand::Quit`] arrives. Returns why polling stopped.
pub(crate) async fn run_watch<S: RunSource>(
    source: &S,
    job_uid: &str,
    timing: PollTiming,
    kickoff: Kickoff,
    event_tx: UnboundedSender<PollEvent>,
    mut cmd_rx: UnboundedReceiver<WatchCommand>,
) -> Result<Option<StopReason>> {
    let mut poller = RunStatusPoller::new(timing);
    let mut timer: ActiveTimer = None;

    let effects = match kickoff {
        Kickoff::Observe(runs) => poller.observe(job_uid, &runs),
        Kickoff::Rerun => {
            let run = source.rerun(job_uid).await?;
            let _ = event_tx.send(PollEvent::Info(InfoEvent::RerunRequested {
                job_uid: job_uid.to_string(),
                run_uid: run.uid,
            }));
            poller.start(job_uid, StartReason::Rerun)
        }
    };
    if poller.phase() == PollPhase::Idle {
        let _ = event_tx.send(PollEvent::Info(InfoEvent::Message(format!(
            "No run in progress for job {job_uid}"
        ))));
        return Ok(None);
    }
    let mut stopped = apply(source, &mut poller, effects, &mut timer, &event_tx).await;

    while stopped.is_none() {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(WatchCommand::Cancel) => {
                        let effects = poller.cancel();
                        stopped = apply(source, &mut poller, effects, &mut timer, &event_tx).await;
                    }
                    Some(WatchCommand::Quit) | None => break,
                }
            }
            id = next_tick(&mut timer) => {
                let effects = poller.on_tick(id);
                stopped = apply(source, &mut poller, effects, &mut timer, &event_tx).await;
            }
        }
    }
    Ok(stopped)
}

/// Carry out `effects`, including any follow-up effects produced by fetches.
/// Returns the stop reason once the poller has stopped.
async fn apply<S: RunSource>(
    source: &S,
    poller: &mut RunStatusPoller,
    effects: Vec<Effect>,
    timer: &mut ActiveTimer,
    event_tx: &UnboundedSender<PollEvent>,
) -> Option<StopReason> {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut stopped = None;

    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Schedule {
                timer: id,
                job_uid,
                delay,
                period,
            } => {
                let mut interval = tokio::time::interval_at(Instant::now() + delay, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *timer = Some((id, interval));
                let _ = event_tx.send(PollEvent::Started { job_uid });
            }
            Effect::CancelTimer { timer: id } => {
                if timer.as_ref().is_some_and(|(active, _)| *active == id) {
                    *timer = None;
                }
            }
            Effect::Fetch { job_uid, seq } => {
                debug!(%job_uid, seq, "fetching runs");
                let result = source
                    .latest_runs(&job_uid)
                    .await
                    .map_err(|e| format!("{e:#}"));
                queue.extend(poller.on_fetch(seq, result));
            }
            Effect::Update { run } => {
                let _ = event_tx.send(PollEvent::RunUpdated { run });
            }
            Effect::FetchFailed { message } => {
                warn!(%message, "run status fetch failed");
                let _ = event_tx.send(PollEvent::FetchFailed { message });
            }
            Effect::Stopped { job_uid, reason } => {
                stopped = Some(reason);
                let _ = event_tx.send(PollEvent::Stopped { job_uid, reason });
            }
            Effect::RefreshCompleted { job_uid } => match source.completed_runs(&job_uid).await {
                Ok(runs) => {
                    let _ = event_tx.send(PollEvent::CompletedRuns { job_uid, runs });
                }
                Err(e) => {
                    let _ = event_tx.send(PollEvent::Info(InfoEvent::Message(format!(
                        "Failed to reload completed runs: {e:#}"
                    ))));
                }
            },
        }
    }
    debug_assert_eq!(timer.as_ref().map(|(id, _)| *id), poller.active_timer());
    stopped
}
