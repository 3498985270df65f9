//! What a task looks like in any run view.
//!
//! The submitted-run view, the completed-run view and live updates all render
//! tasks through [`describe_task`].

use crate::format::{self, PLACEHOLDER};
use crate::model::{Elapsed, RunStatus, Task};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDisplay {
    pub label: String,
    /// Download link, only once the task has produced a result.
    pub link: Option<String>,
    pub duration: String,
    pub size: String,
    pub status: RunStatus,
    /// Lower-case status, used as the row style class.
    pub css_class: String,
}

/// Human label for a task name and whether it produces a downloadable file.
pub fn task_label(name: &str) -> (&str, bool) {
    match name {
        "OverpassQuery" => ("Extract OpenStreetMap Data", false),
        "OSMSchema" => ("Generate OpenStreetMap Schema", false),
        "KML Export" => ("Google Earth (KMZ) File", true),
        "OSM2PBF" => ("OpenStreetMap (PBF) File", true),
        "Shapefile Export" => ("ESRI Shapefile (SHP)", true),
        "OBF Export" => ("OSMAnd (OBF) File", true),
        "Garmin Export" => ("Garmin Map (IMG) File", true),
        "SQLITE Export" => ("SQLite Database File", true),
        other => (other, true),
    }
}

pub fn describe_task(task: &Task) -> TaskDisplay {
    let (label, downloadable) = task_label(&task.name);
    let done = task.status.has_result();
    let result = task.result.as_ref().filter(|_| done);

    let link = result
        .filter(|_| downloadable)
        .and_then(|r| r.url.clone());
    let size = result
        .and_then(|r| r.size.clone())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let duration = task
        .duration
        .as_ref()
        .filter(|_| done)
        .and_then(Elapsed::as_duration)
        .map(format::clock)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    TaskDisplay {
        label: label.to_string(),
        link,
        duration,
        size,
        status: task.status,
        css_class: task.status.as_str().to_ascii_lowercase(),
    }
}
