//! # till-engine
//!
//! Deterministic countdown computation for planning.
//!
//! Given a reference "now" and a target token (an anchor keyword such as
//! `eoq`, or a free-form date such as `jul18`), the engine resolves a concrete
//! target timestamp and expresses the interval in several units: days, weeks,
//! hours, 30-day months, minutes, waking hours, work hours and effective work
//! hours. Nothing here reads the system clock; the caller supplies "now".
//!
//! ## Modules
//!
//! - [`anchor`]: Keyword anchors (end of day/week/month/quarter/year, next Monday) and target resolution
//! - [`parse`]: Free-form date parsing used when a token is not a keyword
//! - [`delta`]: Delta → metric set conversion
//! - [`humanize`]: Natural-language restatement ("4 days from now")
//! - [`error`]: Error types

pub mod anchor;
pub mod delta;
pub mod error;
pub mod humanize;
pub mod parse;

pub use anchor::{
    end_of_day, end_of_month, end_of_quarter, end_of_week, end_of_year, next_monday,
    resolve_target, resolve_target_with_options, start_of_quarter, Anchor, AnchorOptions,
};
pub use delta::{
    compute_metrics, compute_metrics_with_options, delta_seconds, DeltaMetrics, DeltaOptions,
    Metric,
};
pub use error::TillError;
pub use humanize::{natural_delta, natural_time};
pub use parse::parse_datetime;
