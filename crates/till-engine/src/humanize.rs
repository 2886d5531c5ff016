//! Natural-language restatement of a delta: "4 days from now", "an hour ago".
//!
//! Seconds become minutes, hours, days, 30.5-day months
//! and 365-day years, always truncating toward zero.

use chrono::NaiveDateTime;

const SECONDS_PER_DAY: u64 = 86_400;
const DAYS_PER_YEAR: u64 = 365;
const DAYS_PER_MONTH: f64 = 30.5;

/// Describe the magnitude of `seconds` ignoring its sign, e.g. `"3 hours"`.
///
/// Zero seconds reads as `"a moment"`.
pub fn natural_delta(seconds: i64) -> String {
    let abs = seconds.unsigned_abs();
    let total_days = abs / SECONDS_PER_DAY;
    let secs = abs % SECONDS_PER_DAY;
    let years = total_days / DAYS_PER_YEAR;
    let days = total_days % DAYS_PER_YEAR;
    let months = (days as f64 / DAYS_PER_MONTH) as u64;

    if years == 0 && days == 0 {
        return match secs {
            0 => "a moment".to_string(),
            1 => "a second".to_string(),
            2..=59 => format!("{secs} seconds"),
            60..=119 => "a minute".to_string(),
            120..=3599 => format!("{} minutes", secs / 60),
            3600..=7199 => "an hour".to_string(),
            _ => format!("{} hours", secs / 3600),
        };
    }

    if years == 0 {
        return match (days, months) {
            (1, _) => "a day".to_string(),
            (_, 0) => format!("{days} days"),
            (_, 1) => "a month".to_string(),
            (_, m) => format!("{m} months"),
        };
    }

    if years == 1 {
        return match (months, days) {
            (0, 0) => "a year".to_string(),
            (0, 1) => "1 year, 1 day".to_string(),
            (0, d) => format!("1 year, {d} days"),
            (1, _) => "1 year, 1 month".to_string(),
            (m, _) => format!("1 year, {m} months"),
        };
    }

    format!("{years} years")
}

/// Describe `target` relative to `reference`: `"4 days from now"`, `"a minute ago"`,
/// or `"now"` when they are less than a second apart.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use till_engine::humanize::natural_time;
///
/// let now = NaiveDate::from_ymd_opt(2021, 7, 14).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let target = NaiveDate::from_ymd_opt(2021, 7, 18).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(natural_time(now, target), "4 days from now");
/// assert_eq!(natural_time(target, now), "4 days ago");
/// ```
pub fn natural_time(reference: NaiveDateTime, target: NaiveDateTime) -> String {
    let seconds = (target - reference).num_seconds();
    if seconds == 0 {
        return "now".to_string();
    }
    let suffix = if seconds > 0 { "from now" } else { "ago" };
    format!("{} {suffix}", natural_delta(seconds))
}

// ── Tests ───────────────────────────────────────────────────────────────────
