//! Tracing subscriber setup.

use costline_shared::LoggingConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Initializes the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Logs go to stderr
/// so stdout carries only the report.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
