//! Plain-text rendering of a countdown.

use chrono::NaiveDateTime;
use till_engine::{natural_time, DeltaMetrics};

const TARGET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metrics shown on the first line; the rest go on the second.
const FIRST_LINE_METRICS: usize = 5;

/// Render the three report lines:
///
/// ```text
/// 7 days 1.00 weeks 168.00 hours ~0.23 months 10080.00 minutes
/// ~119.00 waking hours ~40.00 work hours ~20.00 effective work hours
/// 2021-01-08 00:00:00 7 days from now
/// ```
pub fn render(now: NaiveDateTime, target: NaiveDateTime, metrics: &DeltaMetrics) -> String {
    let entries: Vec<String> = metrics.entries().iter().map(ToString::to_string).collect();
    let (first, second) = entries.split_at(FIRST_LINE_METRICS);

    format!(
        "{}\n{}\n{} {}\n",
        first.join(" "),
        second.join(" "),
        target.format(TARGET_FORMAT),
        natural_time(now, target)
    )
}
