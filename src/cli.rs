use crate::api::{ExportsClient, JobQuery};
use crate::bounds::{self, FormFields, Verdict, DEFAULT_MAX_AREA_KM2};
use crate::geo::{self, region, Extent};
use crate::model::{PollEvent, Run, RunStatus, StopReason, WatchConfig};
use crate::orchestrator::{
    process_completed_runs, run_watch, Kickoff, PollTiming, WatchCommand,
};
use crate::storage::{RunStore, MAX_RUNS_PER_JOB};
use crate::text_summary;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::Date;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

/// Results go to stdout, as text or one JSON document per line; progress and
/// notices go to stderr.
struct Output {
    tx: mpsc::UnboundedSender<OutputLine>,
    json: bool,
}

impl Output {
    fn line(&self, msg: impl Into<String>) {
        let _ = self.tx.send(OutputLine::Stdout(msg.into()));
    }

    fn lines(&self, lines: Vec<String>) {
        for l in lines {
            self.line(l);
        }
    }

    fn info(&self, msg: impl Into<String>) {
        let _ = self.tx.send(OutputLine::Stderr(msg.into()));
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.line(serde_json::to_string(value)?);
        Ok(())
    }
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hot-export",
    version,
    about = "Validate export extents and follow export runs of a HOT export tool server"
)]
pub struct Cli {
    /// Base URL of the export tool server
    #[arg(long, global = true, default_value = "http://localhost")]
    pub base_url: String,

    /// API token, sent as a bearer token
    #[arg(long, global = true, env = "HOT_EXPORTS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// HTTP request timeout
    #[arg(long, global = true, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Status check period while following a single run
    #[arg(long, global = true, default_value = "3s", value_parser = parse_period)]
    pub poll_interval: Duration,

    /// Status check period while following the run list
    #[arg(long, global = true, default_value = "15s", value_parser = parse_period)]
    pub list_interval: Duration,

    /// Delay before the first status check after a rerun
    #[arg(long, global = true, default_value = "2s")]
    pub startup_delay: humantime::Duration,

    /// Use --auto-save true or --auto-save false to override
    #[arg(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_save: bool,

    /// Write the completed runs of a followed job to this file
    #[arg(long, global = true)]
    pub export_json: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Check whether an extent can be exported
    Validate {
        /// xmin,ymin,xmax,ymax
        #[arg(long, value_parser = geo::parse_bbox, allow_hyphen_values = true)]
        bbox: Option<Extent>,

        /// The bbox is in Web-Mercator meters (EPSG:3857)
        #[arg(long)]
        mercator: bool,

        /// GeoJSON file of export regions; fetched from the server when omitted
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Maximum export area in square kilometers
        #[arg(long, default_value_t = DEFAULT_MAX_AREA_KM2)]
        max_area: f64,
    },
    /// Search export jobs
    Jobs {
        /// Text to look for in job names, descriptions and events
        #[arg(long)]
        search: Option<String>,

        /// Only jobs created by this user
        #[arg(long)]
        user: Option<String>,

        /// Only jobs created on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        since: Option<Date>,

        /// Only jobs created on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        until: Option<Date>,

        /// Only jobs overlapping xmin,ymin,xmax,ymax
        #[arg(long, value_parser = geo::parse_bbox, allow_hyphen_values = true)]
        bbox: Option<Extent>,

        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Show job details
    Job { job_uid: String },
    /// List the runs of a job
    Runs {
        job_uid: String,

        /// Keep refreshing until the newest run finishes
        #[arg(long)]
        follow: bool,
    },
    /// Follow the newest run of a job until it finishes
    Watch { job_uid: String },
    /// Start a new run of a job
    Rerun {
        job_uid: String,

        /// Follow the new run until it finishes
        #[arg(long)]
        watch: bool,
    },
    /// Cancel a run
    Cancel { run_uid: String },
    /// Show the runs of a job saved on this machine
    History {
        job_uid: String,

        /// Maximum number of runs to show
        #[arg(long, default_value_t = MAX_RUNS_PER_JOB)]
        limit: usize,
    },
}

/// A humantime duration that can drive a periodic timer.
fn parse_period(raw: &str) -> Result<Duration, String> {
    let d = humantime::parse_duration(raw).map_err(|e| e.to_string())?;
    if d.is_zero() {
        return Err("period must be greater than zero".to_string());
    }
    Ok(d)
}

fn parse_date(raw: &str) -> Result<Date, String> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, &format).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Build a `WatchConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> WatchConfig {
    WatchConfig {
        base_url: args.base_url.clone(),
        token: args.token.clone(),
        user_agent: format!("hot-export-cli/{}", env!("CARGO_PKG_VERSION")),
        request_timeout: Duration::from(args.timeout),
        poll_interval: args.poll_interval,
        list_interval: args.list_interval,
        startup_delay: Duration::from(args.startup_delay),
        auto_save: args.auto_save,
        export_json: args.export_json.clone(),
    }
}

/// Run the selected command and return the process exit code.
pub async fn run(args: Cli) -> Result<i32> {
    let cfg = build_config(&args);
    debug!(base_url = %cfg.base_url, "configuration");
    let (out_tx, out_handle) = spawn_output_writer();
    let out = Output {
        tx: out_tx,
        json: args.json,
    };

    let res = dispatch(&args.command, &cfg, &out).await;

    drop(out);
    let _ = out_handle.await;
    res
}

async fn dispatch(command: &Command, cfg: &WatchConfig, out: &Output) -> Result<i32> {
    match command {
        Command::Validate {
            bbox,
            mercator,
            regions,
            max_area,
        } => run_validate(cfg, out, *bbox, *mercator, regions.as_deref(), *max_area).await,
        Command::Jobs {
            search,
            user,
            since,
            until,
            bbox,
            pages,
        } => {
            let query = JobQuery {
                search: search.clone(),
                user: user.clone(),
                start_date: *since,
                end_date: *until,
                bbox: *bbox,
            };
            search_jobs(&ExportsClient::new(cfg)?, out, &query, *pages).await
        }
        Command::Job { job_uid } => {
            let job = ExportsClient::new(cfg)?.job(job_uid).await?;
            if out.json {
                out.json(&job)?;
            } else {
                out.lines(text_summary::job_lines(&job));
            }
            Ok(0)
        }
        Command::Runs { job_uid, follow } => {
            let client = ExportsClient::new(cfg)?;
            let runs = client.runs(job_uid, None).await?;
            print_runs(out, &runs, View::List)?;
            if !*follow {
                return Ok(0);
            }
            let kickoff = Kickoff::Observe(runs);
            follow_job(&client, cfg, out, job_uid, cfg.list_interval, kickoff, View::List).await
        }
        Command::Watch { job_uid } => {
            let client = ExportsClient::new(cfg)?;
            let runs = client.runs(job_uid, None).await?;
            print_runs(out, &runs, View::Detail)?;
            let kickoff = Kickoff::Observe(runs);
            follow_job(&client, cfg, out, job_uid, cfg.poll_interval, kickoff, View::Detail).await
        }
        Command::Rerun { job_uid, watch } => {
            let client = ExportsClient::new(cfg)?;
            if *watch {
                return follow_job(
                    &client,
                    cfg,
                    out,
                    job_uid,
                    cfg.poll_interval,
                    Kickoff::Rerun,
                    View::Detail,
                )
                .await;
            }
            let run = client.request_rerun(job_uid).await?;
            info!(job_uid = %job_uid, run_uid = %run.uid, "rerun requested");
            print_runs(out, std::slice::from_ref(&run), View::Detail)?;
            Ok(0)
        }
        Command::Cancel { run_uid } => {
            let message = ExportsClient::new(cfg)?.cancel_run(run_uid).await?;
            let message = message.unwrap_or_else(|| format!("Cancel requested for run {run_uid}"));
            if out.json {
                out.json(&serde_json::json!({ "run_uid": run_uid, "message": message }))?;
            } else {
                out.line(message);
            }
            Ok(0)
        }
        Command::History { job_uid, limit } => {
            show_history(out, &RunStore::default_location()?, job_uid, *limit)
        }
    }
}

async fn search_jobs(
    client: &ExportsClient,
    out: &Output,
    query: &JobQuery,
    pages: u32,
) -> Result<i32> {
    debug!(?query, pages, "searching jobs");
    let mut page = client.jobs(query).await?;
    let mut fetched = 1;
    loop {
        if out.json {
            out.json(&page.jobs)?;
        } else {
            for job in &page.jobs {
                out.line(text_summary::job_line(job));
            }
        }
        if let Some(range) = page.range.as_deref().and_then(text_summary::range_line) {
            out.info(range);
        }
        let Some(next) = page.next.take() else { break };
        if fetched >= pages {
            out.info(format!("More results: {next}"));
            break;
        }
        page = client.jobs_page(next).await?;
        fetched += 1;
    }
    Ok(0)
}

fn show_history(out: &Output, store: &RunStore, job_uid: &str, limit: usize) -> Result<i32> {
    let runs = store.load_recent(job_uid, limit)?;
    if runs.is_empty() && !out.json {
        out.info(format!("No saved runs for job {job_uid}."));
        return Ok(0);
    }
    print_runs(out, &runs, View::Detail)?;
    Ok(0)
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    #[serde(flatten)]
    verdict: &'a Verdict,
    message: String,
    fields: Option<FormFields>,
}

async fn run_validate(
    cfg: &WatchConfig,
    out: &Output,
    bbox: Option<Extent>,
    mercator: bool,
    regions_file: Option<&Path>,
    max_area: f64,
) -> Result<i32> {
    let extent = bbox.map(|e| if mercator { e.mercator_to_lon_lat() } else { e });
    let regions = match (extent.as_ref(), regions_file) {
        (None, _) => Vec::new(),
        (Some(_), Some(path)) => region::load_regions_file(path)?,
        (Some(_), None) => ExportsClient::new(cfg)?.regions().await?,
    };
    debug!(regions = ?regions.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), "export regions");
    let verdict = bounds::validate(extent.as_ref(), &regions, max_area);
    info!(?verdict, regions = regions.len(), "validated extent");

    if out.json {
        out.json(&ValidateOutput {
            verdict: &verdict,
            message: verdict.to_message(),
            fields: extent.as_ref().map(FormFields::from),
        })?;
    } else {
        out.lines(text_summary::verdict_lines(&verdict, extent.as_ref()));
    }
    Ok(if verdict.is_valid() { 0 } else { 2 })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// One line per run.
    List,
    /// Runs with their task tables.
    Detail,
}

fn print_runs(out: &Output, runs: &[Run], view: View) -> Result<()> {
    if out.json {
        return out.json(runs);
    }
    if runs.is_empty() {
        out.info("No runs.");
    }
    for run in runs {
        match view {
            View::List => out.line(text_summary::run_line(run)),
            View::Detail => out.lines(text_summary::run_lines(run)),
        }
    }
    Ok(())
}

fn stop_message(reason: StopReason) -> String {
    match reason {
        StopReason::Terminal(status) => format!("Run finished: {status}"),
        StopReason::NoRuns => "No runs left to follow.".to_string(),
        StopReason::Cancelled => "Stopped following.".to_string(),
    }
}

fn exit_code(stopped: Option<StopReason>) -> i32 {
    match stopped {
        Some(StopReason::Terminal(RunStatus::Failed)) => 1,
        Some(StopReason::Cancelled) => 130,
        _ => 0,
    }
}

fn render_event(out: &Output, ev: &PollEvent, view: View, store: Option<&RunStore>, export: Option<&Path>) {
    if out.json {
        if let Err(e) = out.json(ev) {
            warn!("failed to encode event: {e:#}");
        }
    }
    match ev {
        PollEvent::Started { job_uid } => out.info(format!("Following runs of job {job_uid}")),
        PollEvent::RunUpdated { run } if !out.json => match view {
            View::List => out.line(text_summary::run_line(run)),
            View::Detail => out.lines(text_summary::run_lines(run)),
        },
        PollEvent::RunUpdated { .. } => {}
        PollEvent::FetchFailed { message } => out.info(format!("Status check failed: {message}")),
        PollEvent::Stopped { reason, .. } => out.info(stop_message(*reason)),
        PollEvent::CompletedRuns { job_uid, runs } => {
            if !out.json {
                out.line("Completed runs:");
                for run in runs {
                    out.lines(text_summary::run_lines(run));
                }
            }
            let processed = process_completed_runs(store, export, job_uid, runs);
            debug!(files = ?processed.saved, "post-processed completed runs");
            for msg in processed.messages {
                out.info(msg);
            }
        }
        PollEvent::Info(info) => out.info(info.to_message()),
    }
}

/// Poll a job until its newest run finishes, rendering events as they come.
/// The first Ctrl-C stops polling, a second one abandons the watch.
async fn follow_job(
    client: &ExportsClient,
    cfg: &WatchConfig,
    out: &Output,
    job_uid: &str,
    interval: Duration,
    kickoff: Kickoff,
    view: View,
) -> Result<i32> {
    let timing = PollTiming {
        interval,
        startup_delay: cfg.startup_delay,
    };
    let store = if cfg.auto_save {
        match RunStore::default_location() {
            Ok(store) => Some(store),
            Err(e) => {
                out.info(format!("Auto-save disabled: {e:#}"));
                None
            }
        }
    } else {
        None
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PollEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<WatchCommand>();
    info!(job_uid, ?timing, "following job");

    let watch = run_watch(client, job_uid, timing, kickoff, event_tx, cmd_rx);
    let consume = async {
        while let Some(ev) = event_rx.recv().await {
            render_event(out, &ev, view, store.as_ref(), cfg.export_json.as_deref());
        }
    };
    let work = async { tokio::join!(watch, consume).0 };
    tokio::pin!(work);

    let mut interrupted = false;
    let mut signals = true;
    let stopped = loop {
        tokio::select! {
            res = &mut work => break res?,
            sig = tokio::signal::ctrl_c(), if signals => {
                if let Err(e) = sig {
                    warn!("cannot listen for Ctrl-C: {e}");
                    signals = false;
                    continue;
                }
                let cmd = if interrupted { WatchCommand::Quit } else { WatchCommand::Cancel };
                interrupted = true;
                let _ = cmd_tx.send(cmd);
            }
        }
    };
    Ok(exit_code(stopped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_with_negative_bbox() {
        let cli = Cli::try_parse_from([
            "hot-export",
            "validate",
            "--bbox",
            "-73.5,18,-72,19.25",
            "--max-area",
            "1000",
        ])
        .unwrap();
        match cli.command {
            Command::Validate { bbox, max_area, mercator, regions } => {
                assert_eq!(bbox, Some(Extent::new(-73.5, 18.0, -72.0, 19.25)));
                assert_eq!(max_area, 1000.0);
                assert!(!mercator);
                assert!(regions.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_bbox() {
        assert!(Cli::try_parse_from(["hot-export", "validate", "--bbox", "1,2,3"]).is_err());
    }

    #[test]
    fn config_defaults() {
        let cli = Cli::try_parse_from(["hot-export", "watch", "job-1"]).unwrap();
        let cfg = build_config(&cli);
        assert_eq!(cfg.base_url, "http://localhost");
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
        assert_eq!(cfg.list_interval, Duration::from_secs(15));
        assert_eq!(cfg.startup_delay, Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(cfg.auto_save);
        assert!(cfg.user_agent.starts_with("hot-export-cli/"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hot-export",
            "rerun",
            "job-1",
            "--watch",
            "--auto-save",
            "false",
            "--startup-delay",
            "500ms",
        ])
        .unwrap();
        let cfg = build_config(&cli);
        assert!(!cfg.auto_save);
        assert_eq!(cfg.startup_delay, Duration::from_millis(500));
        assert!(matches!(cli.command, Command::Rerun { watch: true, .. }));
    }

    #[test]
    fn zero_periods_are_rejected() {
        for flag in ["--poll-interval", "--list-interval"] {
            let res = Cli::try_parse_from(["hot-export", "watch", "job-1", flag, "0s"]);
            assert!(res.is_err(), "{flag} 0s should be rejected");
        }
        let cli =
            Cli::try_parse_from(["hot-export", "watch", "job-1", "--poll-interval", "250ms"]).unwrap();
        assert_eq!(cli.poll_interval, Duration::from_millis(250));
        assert!(Cli::try_parse_from(["hot-export", "watch", "job-1", "--poll-interval", "soon"]).is_err());
    }

    fn capture(json: bool) -> (Output, mpsc::UnboundedReceiver<OutputLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Output { tx, json }, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutputLine>) -> (Vec<String>, Vec<String>) {
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        while let Ok(line) = rx.try_recv() {
            match line {
                OutputLine::Stdout(l) => stdout.push(l),
                OutputLine::Stderr(l) => stderr.push(l),
            }
        }
        (stdout, stderr)
    }

    #[test]
    fn parses_job_search_filters() {
        let cli = Cli::try_parse_from([
            "hot-export",
            "jobs",
            "--search",
            "haiti",
            "--since",
            "2015-05-01",
            "--bbox",
            "-180,-90,180,90",
            "--pages",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::Jobs { search, user, since, until, bbox, pages } => {
                assert_eq!(search.as_deref(), Some("haiti"));
                assert!(user.is_none() && until.is_none());
                assert_eq!(since, Some(time::macros::date!(2015 - 05 - 01)));
                assert_eq!(bbox, Some(Extent::new(-180.0, -90.0, 180.0, 90.0)));
                assert_eq!(pages, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["hot-export", "jobs", "--since", "05/01/2015"]).is_err());
        assert!(Cli::try_parse_from(["hot-export", "jobs", "--pages", "0"]).is_err());
    }

    #[tokio::test]
    async fn job_search_follows_next_pages() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/api/jobs?page=2", server.url());
        let _first = server
            .mock("GET", "/api/jobs")
            .match_query(mockito::Matcher::UrlEncoded("user".into(), "mapper".into()))
            .with_header("content-type", "application/json")
            .with_header("content-range", "items 1-1/3")
            .with_header("link", &format!("<{next}>; rel=\"next\""))
            .with_body(r#"[{"uid": "job-1", "name": "Roads"}]"#)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/api/jobs")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_header("content-type", "application/json")
            .with_header("content-range", "items 2-2/3")
            .with_header("link", "</api/jobs?page=3>; rel=\"next\"")
            .with_body(r#"[{"uid": "job-2", "name": "Buildings"}]"#)
            .create_async()
            .await;

        let base_url = server.url();
        let cli = Cli::try_parse_from(["hot-export", "--base-url", base_url.as_str(), "jobs"]).unwrap();
        let client = ExportsClient::new(&build_config(&cli)).unwrap();
        let (out, mut rx) = capture(false);
        let query = JobQuery {
            user: Some("mapper".into()),
            ..JobQuery::default()
        };
        assert_eq!(search_jobs(&client, &out, &query, 2).await.unwrap(), 0);

        let (stdout, stderr) = drain(&mut rx);
        assert_eq!(stdout, vec!["job-1  --  Roads", "job-2  --  Buildings"]);
        assert_eq!(stderr[0], "Displaying 1-1 of 3 results");
        assert_eq!(stderr[1], "Displaying 2-2 of 3 results");
        assert!(stderr[2].starts_with("More results: ") && stderr[2].ends_with("page=3"));
    }

    #[test]
    fn history_renders_saved_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::new(dir.path());
        for (uid, day) in [("run-1", 1), ("run-2", 2), ("run-3", 3)] {
            let run = Run {
                uid: uid.into(),
                status: RunStatus::Completed,
                started_at: Some(format!("2015-06-0{day}T10:00:00Z")),
                finished_at: None,
                duration: None,
                tasks: Vec::new(),
            };
            store.save_run("job-1", &run).unwrap();
        }

        let (out, mut rx) = capture(false);
        show_history(&out, &store, "job-1", 2).unwrap();
        let (stdout, _) = drain(&mut rx);
        assert_eq!(stdout.len(), 2);
        assert!(stdout[0].starts_with("run-3  COMPLETED"), "{}", stdout[0]);
        assert!(stdout[1].starts_with("run-2  COMPLETED"), "{}", stdout[1]);

        let (out, mut rx) = capture(true);
        show_history(&out, &store, "job-1", 10).unwrap();
        let (stdout, _) = drain(&mut rx);
        let runs: Vec<Run> = serde_json::from_str(&stdout[0]).unwrap();
        assert_eq!(runs.len(), 3);

        let (out, mut rx) = capture(false);
        show_history(&out, &store, "job-9", 10).unwrap();
        let (stdout, stderr) = drain(&mut rx);
        assert!(stdout.is_empty());
        assert_eq!(stderr, vec!["No saved runs for job job-9."]);
    }

    #[test]
    fn parses_history_limit() {
        let cli = Cli::try_parse_from(["hot-export", "history", "job-1"]).unwrap();
        assert!(matches!(cli.command, Command::History { limit: MAX_RUNS_PER_JOB, .. }));
        let cli = Cli::try_parse_from(["hot-export", "history", "job-1", "--limit", "2"]).unwrap();
        assert!(matches!(cli.command, Command::History { limit: 2, .. }));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(None), 0);
        assert_eq!(exit_code(Some(StopReason::Terminal(RunStatus::Completed))), 0);
        assert_eq!(exit_code(Some(StopReason::NoRuns)), 0);
        assert_eq!(exit_code(Some(StopReason::Terminal(RunStatus::Failed))), 1);
        assert_eq!(exit_code(Some(StopReason::Cancelled)), 130);
    }
}
