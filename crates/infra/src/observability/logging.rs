//! Tracing subscriber initialisation

use std::io::IsTerminal;

use carcare_domain::{CarCareError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.filter`. Logs go to stderr so command
/// output on stdout stays clean. Calling this twice is harmless.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(true);

    let init_result = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_ansi(std::io::stderr().is_terminal()).try_init()
    };

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| CarCareError::Config(format!("invalid log filter {:?}: {e}", config.filter)))
}
