//! Date anchors: named rules that turn a reference timestamp into a target.
//!
//! Every function here takes the reference "now" explicitly and never reads
//! the system clock, so supplying a fixed reference makes the output fully
//! deterministic.
//!
//! # Keywords
//!
//! | Keyword | Rule |
//! |---|---|
//! | `eod` | [`end_of_day`]: today at 17:00 |
//! | `eow` | [`end_of_week`]: next Friday on/after now, same time-of-day |
//! | `mon` | [`next_monday`]: next Monday strictly after today, same time-of-day |
//! | `eom` | [`end_of_month`]: last day of this month, same time-of-day |
//! | `eoq` | [`end_of_quarter`]: last day of this quarter, same time-of-day |
//! | `eoy` | [`end_of_year`]: Dec 31 of this year, same time-of-day |
//! | `q1`..`q4` | [`start_of_quarter`]: first day of that quarter at midnight |
//!
//! Anything else falls through to [`crate::parse::parse_datetime`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::TillError;
use crate::parse::parse_datetime;

// ── Options ─────────────────────────────────────────────────────────────────

/// Tunables for anchor resolution.
///
/// The [`Default`] value reproduces the fixed rules in the module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorOptions {
    /// Time-of-day that `eod` resolves to.
    pub end_of_day: NaiveTime,
    /// Weekday that `eow` resolves to.
    pub week_end: Weekday,
    /// Weekday that `mon` resolves to.
    pub week_start: Weekday,
}

impl Default for AnchorOptions {
    fn default() -> Self {
        Self {
            end_of_day: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            week_end: Weekday::Fri,
            week_start: Weekday::Mon,
        }
    }
}

// ── Anchor keywords ─────────────────────────────────────────────────────────

/// A symbolic target keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    /// `eod`
    EndOfDay,
    /// `eow`
    EndOfWeek,
    /// `mon`
    NextMonday,
    /// `eom`
    EndOfMonth,
    /// `eoq`
    EndOfQuarter,
    /// `eoy`
    EndOfYear,
    /// `q1`..`q4`
    StartOfQuarter(u32),
}

impl Anchor {
    /// Every keyword accepted by [`Anchor::from_str`], in display order.
    pub const KEYWORDS: &'static [&'static str] =
        &["eod", "eow", "mon", "eom", "eoq", "eoy", "q1", "q2", "q3", "q4"];

    /// Resolve this anchor against `reference` using default options.
    ///
    /// # Errors
    ///
    /// Returns [`TillError::InvalidDatetime`] if the target falls outside the
    /// representable calendar range.
    pub fn resolve(self, reference: NaiveDateTime) -> Result<NaiveDateTime, TillError> {
        self.resolve_with_options(reference, &AnchorOptions::default())
    }

    /// Resolve this anchor against `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`TillError::InvalidDatetime`] if the target falls outside the
    /// representable calendar range.
    pub fn resolve_with_options(
        self,
        reference: NaiveDateTime,
        options: &AnchorOptions,
    ) -> Result<NaiveDateTime, TillError> {
        match self {
            Anchor::EndOfDay => Ok(reference.date().and_time(options.end_of_day)),
            Anchor::EndOfWeek => Ok(weekday_on_or_after(reference, options.week_end)),
            Anchor::NextMonday => Ok(weekday_on_or_after(
                reference + Duration::days(1),
                options.week_start,
            )),
            Anchor::EndOfMonth => end_of_month(reference),
            Anchor::EndOfQuarter => end_of_quarter(reference),
            Anchor::EndOfYear => end_of_year(reference),
            Anchor::StartOfQuarter(quarter) => start_of_quarter(reference, quarter),
        }
    }
}

impl FromStr for Anchor {
    type Err = TillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eod" => Ok(Anchor::EndOfDay),
            "eow" => Ok(Anchor::EndOfWeek),
            "mon" => Ok(Anchor::NextMonday),
            "eom" => Ok(Anchor::EndOfMonth),
            "eoq" => Ok(Anchor::EndOfQuarter),
            "eoy" => Ok(Anchor::EndOfYear),
            "q1" => Ok(Anchor::StartOfQuarter(1)),
            "q2" => Ok(Anchor::StartOfQuarter(2)),
            "q3" => Ok(Anchor::StartOfQuarter(3)),
            "q4" => Ok(Anchor::StartOfQuarter(4)),
            _ => Err(TillError::InvalidAnchor(format!("'{}'", s.trim()))),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::EndOfDay => f.write_str("eod"),
            Anchor::EndOfWeek => f.write_str("eow"),
            Anchor::NextMonday => f.write_str("mon"),
            Anchor::EndOfMonth => f.write_str("eom"),
            Anchor::EndOfQuarter => f.write_str("eoq"),
            Anchor::EndOfYear => f.write_str("eoy"),
            Anchor::StartOfQuarter(q) => write!(f, "q{q}"),
        }
    }
}

// ── resolve_target ──────────────────────────────────────────────────────────

/// Resolve a caller-supplied token to a concrete target timestamp.
///
/// Anchor keywords are tried first; anything else is handed to the free-form
/// parser.
///
/// # Errors
///
/// Returns [`TillError::InvalidExpression`] if the token is neither a keyword
/// nor a parseable date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use till_engine::anchor::resolve_target;
///
/// let now = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let eod = resolve_target(now, "eod").unwrap();
/// assert_eq!(eod.to_string(), "2021-06-15 17:00:00");
/// ```
pub fn resolve_target(reference: NaiveDateTime, token: &str) -> Result<NaiveDateTime, TillError> {
    resolve_target_with_options(reference, token, &AnchorOptions::default())
}

/// Resolve a token to a target timestamp with custom anchor options.
///
/// # Errors
///
/// See [`resolve_target`].
pub fn resolve_target_with_options(
    reference: NaiveDateTime,
    token: &str,
    options: &AnchorOptions,
) -> Result<NaiveDateTime, TillError> {
    match token.parse::<Anchor>() {
        Ok(anchor) => {
            let target = anchor.resolve_with_options(reference, options)?;
            debug!(keyword = %anchor, %target, "Resolved anchor keyword");
            Ok(target)
        }
        Err(_) => parse_datetime(reference, token),
    }
}

// ── Anchor rules ────────────────────────────────────────────────────────────

/// Reference date at 17:00:00.
///
/// No rollover: if `reference` is already past 17:00 the result lies before it.
pub fn end_of_day(reference: NaiveDateTime) -> NaiveDateTime {
    reference
        .date()
        .and_time(AnchorOptions::default().end_of_day)
}

/// Next Friday on or after `reference`, keeping its time-of-day.
pub fn end_of_week(reference: NaiveDateTime) -> NaiveDateTime {
    weekday_on_or_after(reference, Weekday::Fri)
}

/// Next Monday strictly after `reference`'s date, keeping its time-of-day.
///
/// A Monday reference resolves to the following Monday.
pub fn next_monday(reference: NaiveDateTime) -> NaiveDateTime {
    weekday_on_or_after(reference + Duration::days(1), Weekday::Mon)
}

/// Last day of `reference`'s month, keeping its time-of-day.
///
/// # Errors
///
/// Returns [`TillError::InvalidDatetime`] at the edge of the calendar range.
pub fn end_of_month(reference: NaiveDateTime) -> Result<NaiveDateTime, TillError> {
    let last = last_day_of_month(reference.year(), reference.month())
        .ok_or_else(|| out_of_range(reference))?;
    Ok(last.and_time(reference.time()))
}

/// Last day of `reference`'s calendar quarter, keeping its time-of-day.
///
/// Quarters end Mar 31, Jun 30, Sep 30 and Dec 31. A reference in the final
/// month of a quarter resolves within that same month.
///
/// # Errors
///
/// Returns [`TillError::InvalidDatetime`] at the edge of the calendar range.
pub fn end_of_quarter(reference: NaiveDateTime) -> Result<NaiveDateTime, TillError> {
    let q_end_month = quarter_of(reference.month()) * 3;
    let last = last_day_of_month(reference.year(), q_end_month)
        .ok_or_else(|| out_of_range(reference))?;
    Ok(last.and_time(reference.time()))
}

/// December 31 of `reference`'s year, keeping its time-of-day.
///
/// # Errors
///
/// Returns [`TillError::InvalidDatetime`] at the edge of the calendar range.
pub fn end_of_year(reference: NaiveDateTime) -> Result<NaiveDateTime, TillError> {
    let last = NaiveDate::from_ymd_opt(reference.year(), 12, 31)
        .ok_or_else(|| out_of_range(reference))?;
    Ok(last.and_time(reference.time()))
}

/// Midnight on the first day of `quarter` (1-4) in `reference`'s year.
///
/// The year never rolls forward: `q1` in November lies in the past.
///
/// # Errors
///
/// Returns [`TillError::InvalidAnchor`] if `quarter` is not 1-4.
pub fn start_of_quarter(reference: NaiveDateTime, quarter: u32) -> Result<NaiveDateTime, TillError> {
    if !(1..=4).contains(&quarter) {
        return Err(TillError::InvalidAnchor(format!("quarter {quarter}")));
    }
    let month = (quarter - 1) * 3 + 1;
    NaiveDate::from_ymd_opt(reference.year(), month, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or_else(|| out_of_range(reference))
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Advance to the first `weekday` on or after `from`, keeping the time-of-day.
fn weekday_on_or_after(from: NaiveDateTime, weekday: Weekday) -> NaiveDateTime {
    next_weekday_date(from.date(), weekday).and_time(from.time())
}

/// First date on or after `date` that falls on `weekday`.
pub(crate) fn next_weekday_date(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - date.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    date + Duration::days(days_ahead)
}

/// Quarter number (1-4) for a month (1-12).
fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Last calendar day of `month` in `year`.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

fn out_of_range(reference: NaiveDateTime) -> TillError {
    TillError::InvalidDatetime(format!("anchor out of range for '{reference}'"))
}

// ── Tests ───────────────────────────────────────────────────────────────────
