//! Free-form date parsing for targets that are not anchor keywords.
//!
//! Fields the input leaves out are taken from the reference date, with the
//! time-of-day defaulting to midnight. The year never rolls forward: `jan3`
//! typed in December means January 3 of the current year.
//!
//! Parsers are tried from most to least specific; `chrono-english` is the
//! last resort for phrases like "next friday 8pm".

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_english::{parse_date_string, Dialect};
use tracing::{debug, trace};

use crate::anchor::{last_day_of_month, next_weekday_date};
use crate::error::TillError;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a human-entered date or datetime relative to `reference`.
///
/// # Errors
///
/// Returns [`TillError::InvalidExpression`] if no parser recognizes the input.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use till_engine::parse::parse_datetime;
///
/// let now = NaiveDate::from_ymd_opt(2021, 7, 14).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let target = parse_datetime(now, "jul18").unwrap();
/// assert_eq!(target.to_string(), "2021-07-18 00:00:00");
/// ```
pub fn parse_datetime(reference: NaiveDateTime, input: &str) -> Result<NaiveDateTime, TillError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TillError::InvalidExpression(
            "empty date expression".to_string(),
        ));
    }

    if let Some(dt) = try_rfc3339(trimmed) {
        trace!(input = trimmed, "Parsed RFC 3339 datetime");
        return Ok(dt);
    }

    if let Some(dt) = try_iso_datetime(trimmed) {
        trace!(input = trimmed, "Parsed ISO datetime");
        return Ok(dt);
    }

    let normalized = normalize_expression(trimmed);

    if let Some(dt) = try_date_and_time(&normalized, reference) {
        debug!(input = trimmed, %dt, "Parsed date expression");
        return Ok(dt);
    }

    if let Some(time) = parse_time_string(&normalized) {
        let dt = reference.date().and_time(time);
        debug!(input = trimmed, %dt, "Parsed bare time");
        return Ok(dt);
    }

    if normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err(TillError::InvalidExpression(format!(
            "cannot parse date: '{trimmed}' (a bare number must be a day of month or a year)"
        )));
    }

    let base: DateTime<Utc> = Utc.from_utc_datetime(&reference);
    match parse_date_string(&normalized, base, Dialect::Us) {
        Ok(dt) => {
            debug!(input = trimmed, "Parsed natural language date");
            Ok(dt.naive_utc())
        }
        Err(err) => Err(TillError::InvalidExpression(format!(
            "cannot parse date: '{trimmed}' ({err})"
        ))),
    }
}

// ── Expression parsers ──────────────────────────────────────────────────────

/// Lowercase, turn commas into spaces and collapse runs of whitespace.
fn normalize_expression(s: &str) -> String {
    s.to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// RFC 3339 with an offset. The offset is dropped and wall-clock time kept.
fn try_rfc3339(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

fn try_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A date with an optional time on either side: "jul 18 at 2pm",
/// "2021-07-18 9am", "2pm tomorrow".
fn try_date_and_time(s: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    if let Some(date) = try_date(s, reference) {
        return Some(date.and_time(NaiveTime::MIN));
    }

    if let Some((date_part, time_part)) = s.rsplit_once(" at ") {
        let date = try_date(date_part, reference)?;
        let time = parse_time_of_day(time_part)?;
        return Some(date.and_time(time));
    }

    if let Some((date_part, time_part)) = s.rsplit_once(' ') {
        let date = try_date(date_part, reference);
        if let (Some(date), Some(time)) = (date, parse_time_of_day(time_part)) {
            return Some(date.and_time(time));
        }
    }

    let (time_part, date_part) = s.split_once(' ')?;
    let time = parse_time_of_day(time_part)?;
    let date_part = date_part.strip_prefix("on ").unwrap_or(date_part);
    Some(try_date(date_part, reference)?.and_time(time))
}

fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    parse_time_string(s).or_else(|| named_time_to_naive(s))
}

/// Any date-only form.
fn try_date(s: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    let today = reference.date();
    try_iso_date(s)
        .or_else(|| try_anchored(s, today))
        .or_else(|| try_us_numeric(s, today))
        .or_else(|| try_month_day(s, today))
        .or_else(|| parse_weekday(s).map(|wd| next_weekday_date(today, wd)))
}

fn try_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// "today", "tomorrow", "yesterday".
fn try_anchored(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        _ => None,
    }
}

/// "7/18", "7/18/21", "7/18/2021" (month first), or "2021/07/18" when the
/// first field is a four-digit year.
fn try_us_numeric(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    if !parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    if parts.len() == 3 && parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, parts[1].parse().ok()?, parts[2].parse().ok()?);
    }

    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let year = match parts.get(2) {
        Some(y) => parse_year(y)?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month name and day in either order, with an optional trailing year:
/// "jul18", "jul 18", "july 18th", "18 jul", "jul-18", "18-jul-2021",
/// "july 18, 2022". Partial forms take the missing fields from `today`:
/// "18" (day), "jul" (month), "july 2022" (month and year), "2022" (year).
fn try_month_day(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens = split_alpha_numeric(s);
    let tokens: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !matches!(*t, "st" | "nd" | "rd" | "th" | "of"))
        .collect();

    let (month, day, year) = match tokens.as_slice() {
        [a] => {
            if let Some(day) = parse_day(a) {
                (today.month(), day, today.year())
            } else if let Some(month) = parse_month(a) {
                return with_reference_day(today.year(), month, today);
            } else {
                return with_reference_day(parse_full_year(a)?, today.month(), today);
            }
        }
        [a, b] => match month_and_day(a, b) {
            Some((month, day)) => (month, day, today.year()),
            None => return with_reference_day(parse_full_year(b)?, parse_month(a)?, today),
        },
        [a, b, y] => {
            let (month, day) = month_and_day(a, b)?;
            (month, day, parse_year(y)?)
        }
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_and_day(a: &str, b: &str) -> Option<(u32, u32)> {
    if let Some(month) = parse_month(a) {
        return Some((month, parse_day(b)?));
    }
    Some((parse_month(b)?, parse_day(a)?))
}

/// Reference day-of-month in `year`/`month`, clamped to the month's last day.
fn with_reference_day(year: i32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, today.day().min(last.day()))
}

/// Split on whitespace, `-`, `/`, `.` and at every letter/digit boundary:
/// "jul18" → ["jul", "18"], "18-jul-2021" → ["18", "jul", "2021"].
fn split_alpha_numeric(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let words = s
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | '.'))
        .filter(|w| !w.is_empty());
    for word in words {
        let mut current = String::new();
        for ch in word.chars() {
            if let Some(prev) = current.chars().last() {
                if prev.is_ascii_digit() != ch.is_ascii_digit() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            current.push(ch);
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

// ── Parsing helpers ─────────────────────────────────────────────────────────

/// Parse a weekday name (full or abbreviated).
fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a month name to number (1-12).
fn parse_month(s: &str) -> Option<u32> {
    match s {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

fn parse_day(s: &str) -> Option<u32> {
    if s.len() > 2 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|d| (1..=31).contains(d))
}

/// Four-digit years as-is; two-digit years land in 2000-2099.
fn parse_year(s: &str) -> Option<i32> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match s.len() {
        2 => s.parse::<i32>().ok().map(|y| 2000 + y),
        4 => s.parse().ok(),
        _ => None,
    }
}

fn parse_full_year(s: &str) -> Option<i32> {
    if s.len() != 4 {
        return None;
    }
    parse_year(s)
}

/// Map named time to NaiveTime.
fn named_time_to_naive(s: &str) -> Option<NaiveTime> {
    match s {
        "morning" => NaiveTime::from_hms_opt(9, 0, 0),
        "noon" | "lunch" => NaiveTime::from_hms_opt(12, 0, 0),
        "afternoon" => NaiveTime::from_hms_opt(13, 0, 0),
        "evening" => NaiveTime::from_hms_opt(18, 0, 0),
        "night" => NaiveTime::from_hms_opt(21, 0, 0),
        "midnight" => NaiveTime::from_hms_opt(0, 0, 0),
        _ => None,
    }
}

/// Parse a time string: "2pm", "2:30pm", "14:00", "14:30:00".
fn parse_time_string(s: &str) -> Option<NaiveTime> {
    let s = s.trim();

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
        return Some(t);
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        return Some(t);
    }

    let s_no_space = s.replace(' ', "");
    let (time_part, is_pm) = if let Some(rest) = s_no_space.strip_suffix("pm") {
        (rest, true)
    } else if let Some(rest) = s_no_space.strip_suffix("am") {
        (rest, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = time_part.split(':').collect();
    let hour: u32 = parts.first()?.parse().ok()?;
    let minute: u32 = match parts.get(1) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour24 = match (hour, is_pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday, July 14, 2021 at 10:00.
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // ── Month/day forms ─────────────────────────────────────────────────

    #[test]
    fn test_compact_month_day() {
        assert_eq!(parse_datetime(reference(), "jul18").unwrap(), at(2021, 7, 18, 0, 0));
    }

    #[test]
    fn test_month_day_with_space_and_case() {
        assert_eq!(parse_datetime(reference(), "July 18").unwrap(), at(2021, 7, 18, 0, 0));
    }

    #[test]
    fn test_day_before_month() {
        assert_eq!(parse_datetime(reference(), "18jul").unwrap(), at(2021, 7, 18, 0, 0));
        assert_eq!(parse_datetime(reference(), "18 Jul").unwrap(), at(2021, 7, 18, 0, 0));
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(
            parse_datetime(reference(), "august 3rd").unwrap(),
            at(2021, 8, 3, 0, 0)
        );
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(
            parse_datetime(reference(), "July 18, 2022").unwrap(),
            at(2022, 7, 18, 0, 0)
        );
        assert_eq!(parse_datetime(reference(), "jul 18 22").unwrap(), at(2022, 7, 18, 0, 0));
    }

    #[test]
    fn test_past_month_day_keeps_current_year() {
        assert_eq!(parse_datetime(reference(), "jan3").unwrap(), at(2021, 1, 3, 0, 0));
    }

    #[test]
    fn test_invalid_day_of_month() {
        let today = reference().date();
        assert_eq!(try_month_day("feb30", today), None);
        assert_eq!(try_month_day("jul32", today), None);
    }

    #[test]
    fn test_partial_dates_take_missing_fields_from_reference() {
        assert_eq!(parse_datetime(reference(), "18").unwrap(), at(2021, 7, 18, 0, 0));
        assert_eq!(parse_datetime(reference(), "18th").unwrap(), at(2021, 7, 18, 0, 0));
        assert_eq!(parse_datetime(reference(), "jul").unwrap(), at(2021, 7, 14, 0, 0));
        assert_eq!(parse_datetime(reference(), "july 2022").unwrap(), at(2022, 7, 14, 0, 0));
        assert_eq!(parse_datetime(reference(), "2023").unwrap(), at(2023, 7, 14, 0, 0));
    }

    #[test]
    fn test_month_only_clamps_to_last_day() {
        let today = NaiveDate::from_ymd_opt(2021, 7, 31).unwrap();
        assert_eq!(try_month_day("feb", today), NaiveDate::from_ymd_opt(2021, 2, 28));
        assert_eq!(try_month_day("feb 2024", today), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_separated_month_day() {
        assert_eq!(parse_datetime(reference(), "jul-18").unwrap(), at(2021, 7, 18, 0, 0));
        assert_eq!(
            parse_datetime(reference(), "18-jul-2021").unwrap(),
            at(2021, 7, 18, 0, 0)
        );
        assert_eq!(parse_datetime(reference(), "jul. 18").unwrap(), at(2021, 7, 18, 0, 0));
    }

    #[test]
    fn test_bare_number_out_of_day_range_is_rejected() {
        for input in ["32", "0", "123", "99999"] {
            let err = parse_datetime(reference(), input).unwrap_err();
            assert!(matches!(err, TillError::InvalidExpression(_)), "{input}: {err}");
        }
    }

    // ── Numeric forms ───────────────────────────────────────────────────

    #[test]
    fn test_iso_date() {
        assert_eq!(
            parse_datetime(reference(), "2021-12-25").unwrap(),
            at(2021, 12, 25, 0, 0)
        );
    }

    #[test]
    fn test_iso_datetime() {
        assert_eq!(
            parse_datetime(reference(), "2021-12-25 08:30").unwrap(),
            at(2021, 12, 25, 8, 30)
        );
        assert_eq!(
            parse_datetime(reference(), "2021-12-25T08:30:00").unwrap(),
            at(2021, 12, 25, 8, 30)
        );
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_datetime(reference(), "2021-12-25T08:30:00-05:00").unwrap(),
            at(2021, 12, 25, 8, 30)
        );
    }

    #[test]
    fn test_us_numeric() {
        assert_eq!(parse_datetime(reference(), "7/18").unwrap(), at(2021, 7, 18, 0, 0));
        assert_eq!(parse_datetime(reference(), "12/1/22").unwrap(), at(2022, 12, 1, 0, 0));
        assert_eq!(
            parse_datetime(reference(), "12/1/2023").unwrap(),
            at(2023, 12, 1, 0, 0)
        );
    }

    #[test]
    fn test_year_first_slashes() {
        assert_eq!(
            parse_datetime(reference(), "2021/07/18").unwrap(),
            at(2021, 7, 18, 0, 0)
        );
    }

    // ── Weekdays and relative days ──────────────────────────────────────

    #[test]
    fn test_weekday_on_or_after_today() {
        assert_eq!(parse_datetime(reference(), "friday").unwrap(), at(2021, 7, 16, 0, 0));
        // reference is a Wednesday
        assert_eq!(parse_datetime(reference(), "wed").unwrap(), at(2021, 7, 14, 0, 0));
    }

    #[test]
    fn test_tomorrow() {
        assert_eq!(parse_datetime(reference(), "tomorrow").unwrap(), at(2021, 7, 15, 0, 0));
    }

    // ── Times ───────────────────────────────────────────────────────────

    #[test]
    fn test_bare_time_is_today() {
        assert_eq!(parse_datetime(reference(), "2pm").unwrap(), at(2021, 7, 14, 14, 0));
        assert_eq!(parse_datetime(reference(), "16:45").unwrap(), at(2021, 7, 14, 16, 45));
    }

    #[test]
    fn test_date_at_time() {
        assert_eq!(
            parse_datetime(reference(), "jul18 at 2:30pm").unwrap(),
            at(2021, 7, 18, 14, 30)
        );
        assert_eq!(
            parse_datetime(reference(), "tomorrow noon").unwrap(),
            at(2021, 7, 15, 12, 0)
        );
        assert_eq!(
            parse_datetime(reference(), "2021-08-01 9am").unwrap(),
            at(2021, 8, 1, 9, 0)
        );
    }

    #[test]
    fn test_time_before_date() {
        assert_eq!(
            parse_datetime(reference(), "2pm tomorrow").unwrap(),
            at(2021, 7, 15, 14, 0)
        );
        assert_eq!(
            parse_datetime(reference(), "9:30am on friday").unwrap(),
            at(2021, 7, 16, 9, 30)
        );
        assert_eq!(parse_datetime(reference(), "noon jul18").unwrap(), at(2021, 7, 18, 12, 0));
    }

    #[test]
    fn test_twelve_hour_edges() {
        assert_eq!(parse_time_string("12am"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_time_string("12pm"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time_string("13pm"), None);
    }

    // ── Natural language fallback ───────────────────────────────────────

    #[test]
    fn test_natural_language_fallback() {
        let target = parse_datetime(reference(), "next friday").unwrap();
        assert_eq!(target.weekday(), Weekday::Fri);
        assert!(target > reference());
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input() {
        let err = parse_datetime(reference(), "   ").unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {err}");
    }

    #[test]
    fn test_unrecognizable_input() {
        let err = parse_datetime(reference(), "not a date at all").unwrap_err();
        assert!(matches!(err, TillError::InvalidExpression(_)));
        assert!(err.to_string().contains("not a date at all"), "got: {err}");
    }

    #[test]
    fn test_split_alpha_numeric() {
        assert_eq!(split_alpha_numeric("jul18"), vec!["jul", "18"]);
        assert_eq!(split_alpha_numeric("18th of july"), vec!["18", "th", "of", "july"]);
        assert_eq!(split_alpha_numeric("18-jul-2021"), vec!["18", "jul", "2021"]);
    }
}
