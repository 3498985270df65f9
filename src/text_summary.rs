//! Text rendering for CLI output.
//!
//! Every view of a run (submitted, completed, live update) goes through
//! [`run_lines`] so tasks look the same wherever they appear.

use crate::bounds::{FormFields, Verdict};
use crate::display::{describe_task, TaskDisplay};
use crate::format::{self, PLACEHOLDER};
use crate::geo::region::parse_polygons;
use crate::geo::Extent;
use crate::model::{Elapsed, Job, Run};

fn or_placeholder(value: Option<&str>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format::timestamp)
}

/// Bounding box of a job's GeoJSON extent, if it is a (multi)polygon.
pub(crate) fn job_extent(job: &Job) -> Option<Extent> {
    let polygons = parse_polygons(job.extent.as_ref()?).ok()?;
    let points: Vec<_> = polygons
        .iter()
        .flat_map(|p| p.exterior.iter().copied())
        .collect();
    Extent::covering(&points)
}

pub(crate) fn job_lines(job: &Job) -> Vec<String> {
    let mut lines = vec![format!("Job: {} ({})", job.name, job.uid)];
    if !job.description.trim().is_empty() {
        lines.push(format!("Description: {}", job.description));
    }
    if let Some(event) = job.event.as_deref() {
        lines.push(format!("Event: {event}"));
    }
    lines.push(format!("Created: {}", or_placeholder(job.created_at.as_deref())));
    if !job.export_formats.is_empty() {
        lines.push(format!("Formats: {}", job.export_formats.join(", ")));
    }
    if let Some(area) = job.area {
        lines.push(format!("Area: {} sq km", format::thousands(area)));
    }
    if let Some(e) = job_extent(job) {
        lines.push(format!(
            "Extent: {:.4}, {:.4}, {:.4}, {:.4}",
            e.min_x, e.min_y, e.max_x, e.max_y
        ));
    }
    lines.push(format!("Published: {}", if job.published { "yes" } else { "no" }));
    lines
}

/// One line per job in search results.
pub(crate) fn job_line(job: &Job) -> String {
    let mut line = format!(
        "{}  {}  {}",
        job.uid,
        or_placeholder(job.created_at.as_deref()),
        job.name
    );
    if let Some(event) = job.event.as_deref().filter(|e| !e.trim().is_empty()) {
        line.push_str(&format!(" [{event}]"));
    }
    line
}

/// `items 1-20/123` becomes `Displaying 1-20 of 123 results`.
pub(crate) fn range_line(content_range: &str) -> Option<String> {
    let spec = content_range.trim().strip_prefix("items")?.trim();
    let (shown, total) = spec.split_once('/')?;
    Some(format!("Displaying {} of {} results", shown.trim(), total.trim()))
}

/// One-line summary used by the run list.
pub(crate) fn run_line(run: &Run) -> String {
    let duration = run
        .duration
        .as_ref()
        .and_then(Elapsed::as_duration)
        .map(format::humanize)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        "{}  {:<9}  started {}  finished {}  took {}",
        run.uid,
        run.status,
        or_placeholder(run.started_at.as_deref()),
        or_placeholder(run.finished_at.as_deref()),
        duration
    )
}

pub(crate) fn task_row(d: &TaskDisplay) -> String {
    let label = match d.link.as_deref() {
        Some(url) => format!("{} <{}>", d.label, url),
        None => d.label.clone(),
    };
    format!("  {:<10} {:<14} {:<10} {}", d.status, d.duration, d.size, label)
}

pub(crate) fn run_lines(run: &Run) -> Vec<String> {
    let mut lines = vec![run_line(run)];
    lines.extend(run.tasks.iter().map(|t| task_row(&describe_task(t))));
    lines
}

pub(crate) fn verdict_lines(verdict: &Verdict, extent: Option<&Extent>) -> Vec<String> {
    let mut lines = vec![verdict.to_message()];
    if let Some(e) = extent {
        let f = FormFields::from(e);
        lines.push(format!("xmin={} ymin={} xmax={} ymax={}", f.xmin, f.ymin, f.xmax, f.ymax));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunStatus, Task, TaskResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn job() -> Job {
        serde_json::from_value(json!({
            "uid": "job-1",
            "name": "Haiti roads",
            "description": "Road network",
            "created_at": "2015-06-01T14:04:05Z",
            "export_formats": ["shp", "kml"],
            "extent": {"type": "Polygon", "coordinates": [[[-73, 18], [-72, 18], [-72, 19.5], [-73, 19.5], [-73, 18]]]}
        }))
        .unwrap()
    }

    #[test]
    fn job_details() {
        assert_eq!(
            job_lines(&job()),
            vec![
                "Job: Haiti roads (job-1)",
                "Description: Road network",
                "Created: 2:04:05 pm, June 1 2015",
                "Formats: shp, kml",
                "Extent: -73.0000, 18.0000, -72.0000, 19.5000",
                "Published: no",
            ]
        );
    }

    #[test]
    fn job_without_polygon_extent() {
        let mut j = job();
        j.extent = Some(json!({"type": "Point", "coordinates": [1, 2]}));
        assert_eq!(job_extent(&j), None);
        j.extent = None;
        assert!(job_lines(&j).iter().all(|l| !l.starts_with("Extent")));
    }

    #[test]
    fn job_search_lines() {
        let mut j = job();
        assert_eq!(job_line(&j), "job-1  2:04:05 pm, June 1 2015  Haiti roads");
        j.event = Some("Earthquake".into());
        j.created_at = None;
        assert_eq!(job_line(&j), "job-1  --  Haiti roads [Earthquake]");

        assert_eq!(
            range_line("items 1-20/123").as_deref(),
            Some("Displaying 1-20 of 123 results")
        );
        assert_eq!(range_line("bytes 0-99/100"), None);
        assert_eq!(range_line("items 1-20"), None);
    }

    #[test]
    fn run_with_tasks() {
        let run = Run {
            uid: "run-1".into(),
            status: RunStatus::Completed,
            started_at: Some("2015-06-01T14:04:05Z".into()),
            finished_at: None,
            duration: Some(Elapsed::Seconds(3725.0)),
            tasks: vec![Task {
                uid: "t1".into(),
                name: "KML Export".into(),
                status: RunStatus::Completed,
                started_at: None,
                finished_at: None,
                duration: Some(Elapsed::Seconds(1.5)),
                result: Some(TaskResult {
                    url: Some("http://x/a.kmz".into()),
                    size: Some("1.2 MB".into()),
                }),
            }],
        };
        let lines = run_lines(&run);
        assert_eq!(
            lines[0],
            "run-1  COMPLETED  started 2:04:05 pm, June 1 2015  finished --  took 1h 2m 5s"
        );
        assert_eq!(
            lines[1],
            "  COMPLETED  00:00:01.500   1.2 MB     Google Earth (KMZ) File <http://x/a.kmz>"
        );
    }

    #[test]
    fn verdict_with_form_fields() {
        let e = Extent::new(-73.0, 18.0, -72.0, 19.0);
        let lines = verdict_lines(&Verdict::Valid { area_km2: 11_700.0 }, Some(&e));
        assert_eq!(lines[0], "Extents are valid (11,700 sq km).");
        assert_eq!(
            lines[1],
            "xmin=-73.0000000000 ymin=18.0000000000 xmax=-72.0000000000 ymax=19.0000000000"
        );
        assert_eq!(verdict_lines(&Verdict::NoExtent, None), vec!["Select area to export."]);
    }
}
