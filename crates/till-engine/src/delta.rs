//! Conversion of a single time delta into human-oriented magnitudes.
//!
//! All metrics derive from the same signed number of seconds. Work hours and
//! effective work hours are defined in terms of the unrounded weeks value, so
//! `work_hours == weeks * 40` holds exactly rather than after a second round.
//! Negative deltas (targets in the past) simply produce negative metrics.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::trace;

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3_600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SECONDS_PER_WEEK: f64 = 604_800.0;
/// A 30-day month.
pub const SECONDS_PER_MONTH: f64 = 2_592_000.0;

// ── Options ─────────────────────────────────────────────────────────────────

/// Scaling factors for the derived "human" metrics.
///
/// The [`Default`] value is 17 waking hours a day and five 8-hour workdays a
/// week, of which 4 hours a day are productive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaOptions {
    pub waking_hours_per_day: f64,
    pub workdays_per_week: f64,
    pub work_hours_per_day: f64,
    pub effective_hours_per_day: f64,
}

impl Default for DeltaOptions {
    fn default() -> Self {
        Self {
            waking_hours_per_day: 17.0,
            workdays_per_week: 5.0,
            work_hours_per_day: 8.0,
            effective_hours_per_day: 4.0,
        }
    }
}

// ── Metric set ──────────────────────────────────────────────────────────────

/// One labeled value of a [`DeltaMetrics`] set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    /// Stable identifier, e.g. `"work_hours"`.
    pub name: &'static str,
    /// Unit label used when printing, e.g. `"work hours"`.
    pub unit: &'static str,
    pub value: f64,
    /// Decimal places shown when printing.
    pub precision: usize,
    /// Printed with a leading `~`.
    pub approximate: bool,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.approximate { "~" } else { "" };
        write!(
            f,
            "{prefix}{value:.precision$} {unit}",
            value = self.value,
            precision = self.precision,
            unit = self.unit
        )
    }
}

/// Every metric for one delta.
///
/// Values are unrounded except `days`; rounding to two decimals happens when a
/// [`Metric`] is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaMetrics {
    /// The delta the metrics were computed from.
    pub total_seconds: f64,
    /// Whole days, rounded half away from zero.
    pub days: i64,
    pub weeks: f64,
    pub hours: f64,
    /// 30-day months.
    pub months: f64,
    pub minutes: f64,
    pub waking_hours: f64,
    pub work_hours: f64,
    pub effective_work_hours: f64,
}

impl DeltaMetrics {
    /// Compute every metric from a delta in seconds.
    pub fn from_seconds(seconds: f64, options: &DeltaOptions) -> Self {
        let weeks = diff_weeks(seconds);
        let metrics = Self {
            total_seconds: seconds,
            days: diff_days(seconds),
            weeks,
            hours: diff_hours(seconds),
            months: diff_months(seconds),
            minutes: diff_minutes(seconds),
            waking_hours: options.waking_hours_per_day / 24.0 * seconds / SECONDS_PER_HOUR,
            work_hours: weeks * options.workdays_per_week * options.work_hours_per_day,
            effective_work_hours: weeks
                * options.workdays_per_week
                * options.effective_hours_per_day,
        };
        trace!(?metrics, "Computed delta metrics");
        metrics
    }

    /// The metrics in display order: days, weeks, hours, months, minutes,
    /// waking hours, work hours, effective work hours.
    pub fn entries(&self) -> [Metric; 8] {
        [
            metric("days", "days", self.days as f64, 0, false),
            metric("weeks", "weeks", self.weeks, 2, false),
            metric("hours", "hours", self.hours, 2, false),
            metric("months", "months", self.months, 2, true),
            metric("minutes", "minutes", self.minutes, 2, false),
            metric("waking_hours", "waking hours", self.waking_hours, 2, true),
            metric("work_hours", "work hours", self.work_hours, 2, true),
            metric(
                "effective_work_hours",
                "effective work hours",
                self.effective_work_hours,
                2,
                true,
            ),
        ]
    }
}

fn metric(
    name: &'static str,
    unit: &'static str,
    value: f64,
    precision: usize,
    approximate: bool,
) -> Metric {
    Metric {
        name,
        unit,
        value,
        precision,
        approximate,
    }
}

// ── compute_metrics ─────────────────────────────────────────────────────────

/// Compute the metric set for the interval from `now` to `future`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use till_engine::delta::compute_metrics;
///
/// let now = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let future = NaiveDate::from_ymd_opt(2021, 1, 8).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let metrics = compute_metrics(now, future);
/// assert_eq!(metrics.days, 7);
/// assert_eq!(format!("{:.2}", metrics.hours), "168.00");
/// ```
pub fn compute_metrics(now: NaiveDateTime, future: NaiveDateTime) -> DeltaMetrics {
    compute_metrics_with_options(now, future, &DeltaOptions::default())
}

/// Compute the metric set with custom scaling factors.
pub fn compute_metrics_with_options(
    now: NaiveDateTime,
    future: NaiveDateTime,
    options: &DeltaOptions,
) -> DeltaMetrics {
    DeltaMetrics::from_seconds(delta_seconds(now, future), options)
}

/// Signed seconds from `now` to `future`, with microsecond resolution.
pub fn delta_seconds(now: NaiveDateTime, future: NaiveDateTime) -> f64 {
    let delta = future - now;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    }
}

// ── Individual conversions ──────────────────────────────────────────────────

pub fn diff_days(seconds: f64) -> i64 {
    (seconds / SECONDS_PER_DAY).round() as i64
}

pub fn diff_weeks(seconds: f64) -> f64 {
    seconds / SECONDS_PER_WEEK
}

pub fn diff_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

pub fn diff_months(seconds: f64) -> f64 {
    seconds / SECONDS_PER_MONTH
}

pub fn diff_minutes(seconds: f64) -> f64 {
    seconds / SECONDS_PER_MINUTE
}

/// Hours scaled by 17/24 usable hours per day.
pub fn diff_waking_hours(seconds: f64) -> f64 {
    (17.0 / 24.0) * seconds / SECONDS_PER_HOUR
}

/// 5 working days per week, 8 hours per day.
pub fn diff_work_hours(seconds: f64) -> f64 {
    diff_weeks(seconds) * 5.0 * 8.0
}

/// 5 working days per week, 4 effective hours per day.
pub fn diff_effective_work_hours(seconds: f64) -> f64 {
    diff_weeks(seconds) * 5.0 * 4.0
}

// ── Tests ───────────────────────────────────────────────────────────────────
