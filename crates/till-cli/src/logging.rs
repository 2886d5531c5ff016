//! Diagnostic logging to stderr.
//!
//! Quiet by default so stdout carries only the report. Set `RUST_LOG`
//! (e.g. `RUST_LOG=till_engine=debug`) to see which parser matched a target.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "till=warn,till_engine=warn";

/// Install the global subscriber. Subsequent calls are ignored.
pub fn init_logging() {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    };

    let layer = fmt::layer()
        .compact()
        .with_target(true)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .ok();
}
