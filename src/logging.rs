//! Tracing setup for the interactive binary.
//!
//! Logs go to stderr so the menus on stdout stay readable. The level
//! defaults to `warn` and follows `RUST_LOG` when it is set, e.g.
//! `RUST_LOG=fleet_tower=debug`.

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
