//! Human-readable formatting shared by the text renderers.

use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

/// Shown in place of values that do not exist yet.
pub const PLACEHOLDER: &str = "--";

/// Round to an integer and group thousands with commas.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `HH:MM:SS.mmm`
pub fn clock(d: Duration) -> String {
    let total_ms = d.as_millis();
    let ms = total_ms % 1000;
    let secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        ms
    )
}

/// Whole-second humanized duration, e.g. `1h 2m 3s`.
pub fn humanize(d: Duration) -> String {
    humantime::format_duration(Duration::from_secs(d.as_secs())).to_string()
}

/// Render an RFC 3339 timestamp as `10:04:05 am, June 1 2015` (UTC offset kept
/// as sent). Unparseable input is returned unchanged.
pub fn timestamp(raw: &str) -> String {
    let fmt = format_description!(
        "[hour repr:12 padding:none]:[minute]:[second] [period case:lower], [month repr:long] [day padding:none] [year]"
    );
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|t| t.format(&fmt).ok())
        .unwrap_or_else(|| raw.to_string())
}
