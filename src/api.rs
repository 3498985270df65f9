//! REST client for the export tool backend.

use crate::geo::region::{parse_regions, Region};
use crate::geo::Extent;
use crate::model::{Job, Run, RunStatus, WatchConfig};
use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Where the poller reads run state from.
pub(crate) trait RunSource {
    /// All runs of a job, newest first.
    async fn latest_runs(&self, job_uid: &str) -> Result<Vec<Run>>;
    async fn completed_runs(&self, job_uid: &str) -> Result<Vec<Run>>;
    async fn rerun(&self, job_uid: &str) -> Result<Run>;
}

/// Filters for the job search. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct JobQuery {
    /// Free text matched against job names, descriptions and events.
    pub search: Option<String>,
    pub user: Option<String>,
    pub start_date: Option<time::Date>,
    pub end_date: Option<time::Date>,
    /// Jobs whose extent overlaps this box.
    pub bbox: Option<Extent>,
}

/// One page of search results.
#[derive(Debug)]
pub(crate) struct JobPage {
    pub jobs: Vec<Job>,
    /// Raw `Content-Range`, e.g. `items 1-20/123`.
    pub range: Option<String>,
    pub next: Option<Url>,
    pub prev: Option<Url>,
}

#[derive(Clone)]
pub(crate) struct ExportsClient {
    http: reqwest::Client,
    base: Url,
}

impl ExportsClient {
    pub fn new(cfg: &WatchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = cfg.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("API token contains invalid header characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        let mut base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;
        // Url::join replaces the last path segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid endpoint path: {path}"))
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("{url} returned HTTP {status}");
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.send(&url)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }

    /// First page of jobs matching `query`.
    pub async fn jobs(&self, query: &JobQuery) -> Result<JobPage> {
        let mut url = self.endpoint("api/jobs")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("search", search);
            }
            if let Some(user) = query.user.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("user", user);
            }
            if let Some(date) = query.start_date {
                pairs.append_pair("start_date", &date.to_string());
            }
            if let Some(date) = query.end_date {
                pairs.append_pair("end_date", &date.to_string());
            }
            if let Some(e) = query.bbox {
                let bbox = format!("{},{},{},{}", e.min_x, e.min_y, e.max_x, e.max_y);
                pairs.append_pair("bbox", &bbox);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.jobs_page(url).await
    }

    /// A page of jobs at `url`, usually the `next` or `prev` link of another page.
    pub async fn jobs_page(&self, url: Url) -> Result<JobPage> {
        let resp = self.send(&url).await?;
        let headers = resp.headers();
        let range = headers
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut next = None;
        let mut prev = None;
        for value in headers.get_all(LINK) {
            let Ok(value) = value.to_str() else { continue };
            for (rel, target) in parse_link_header(value) {
                let slot = match rel.as_str() {
                    "next" => &mut next,
                    "prev" | "previous" => &mut prev,
                    _ => continue,
                };
                match url.join(&target) {
                    Ok(link) => *slot = Some(link),
                    Err(e) => debug!(%target, "ignoring bad link: {e}"),
                }
            }
        }
        let jobs = resp
            .json::<Vec<Job>>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))?;
        Ok(JobPage {
            jobs,
            range,
            next,
            prev,
        })
    }

    pub async fn job(&self, job_uid: &str) -> Result<Job> {
        let url = self.endpoint(&format!("api/jobs/{job_uid}"))?;
        self.get_json(url).await
    }

    pub async fn runs(&self, job_uid: &str, status: Option<RunStatus>) -> Result<Vec<Run>> {
        let mut url = self.endpoint("api/runs")?;
        url.query_pairs_mut().append_pair("job_uid", job_uid);
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        self.get_json(url).await
    }

    pub async fn request_rerun(&self, job_uid: &str) -> Result<Run> {
        let mut url = self.endpoint("api/rerun")?;
        url.query_pairs_mut().append_pair("job_uid", job_uid);
        self.get_json(url).await
    }

    /// Ask the backend to stop a run. Returns the backend's message, if any.
    pub async fn cancel_run(&self, run_uid: &str) -> Result<Option<String>> {
        let mut url = self.endpoint("api/cancel_run")?;
        url.query_pairs_mut().append_pair("run_uid", run_uid);
        let body: serde_json::Value = self.get_json(url).await?;
        Ok(body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string))
    }

    pub async fn regions(&self) -> Result<Vec<Region>> {
        let url = self.endpoint("api/regions")?;
        let value: serde_json::Value = self.get_json(url.clone()).await?;
        parse_regions(&value).with_context(|| format!("invalid regions from {url}"))
    }
}

/// `(rel, target)` pairs of an RFC 8288 `Link` header. Targets may contain
/// commas, so entries are split on `<` rather than `,`.
fn parse_link_header(value: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start + 1..].find('>') else { break };
        let target = &rest[start + 1..start + 1 + len];
        rest = &rest[start + 2 + len..];
        let params = rest.find('<').map_or(rest, |next| &rest[..next]);
        for param in params.split(';') {
            let Some((key, val)) = param.split_once('=') else { continue };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let val = val.trim().trim_end_matches(',').trim().trim_matches('"');
            for rel in val.split_whitespace() {
                links.push((rel.to_ascii_lowercase(), target.to_string()));
            }
        }
    }
    links
}

impl RunSource for ExportsClient {
    async fn latest_runs(&self, job_uid: &str) -> Result<Vec<Run>> {
        self.runs(job_uid, None).await
    }

    async fn completed_runs(&self, job_uid: &str) -> Result<Vec<Run>> {
        self.runs(job_uid, Some(RunStatus::Completed)).await
    }

    async fn rerun(&self, job_uid: &str) -> Result<Run> {
        self.request_rerun(job_uid).await
    }
}
