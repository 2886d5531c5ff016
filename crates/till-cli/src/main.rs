mod logging;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{CommandFactory, Parser};
use till_engine::{compute_metrics, resolve_target, Anchor};
use tracing::debug;

/// Exit code when no target is given.
const EXIT_USAGE: u8 = 2;

/// Print interesting time diffs between now and some future date.
///
/// Helps you plan things and set your expectations.
#[derive(Parser)]
#[command(name = "till", version, about, long_about = None)]
struct Cli {
    /// Target: an anchor keyword (eod, eow, mon, eom, eoq, eoy, q1-q4) or a
    /// date such as "jul18", "2026-12-25 09:00" or "next friday 8pm"
    target: Option<String>,
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    let Some(target) = cli.target else {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!(
            "\nGive a target date, or one of: {}",
            Anchor::KEYWORDS.join(", ")
        );
        return ExitCode::from(EXIT_USAGE);
    };

    match run(&target, Local::now().naive_local()) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(target: &str, now: NaiveDateTime) -> Result<String> {
    let future =
        resolve_target(now, target).with_context(|| format!("cannot resolve target '{target}'"))?;
    debug!(%now, %future, "Resolved target");

    let metrics = compute_metrics(now, future);
    Ok(report::render(now, future, &metrics))
}
