//! Process-level setup for the binary

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, SqlError};

/// Install the global tracing subscriber, writing to stderr
///
/// Defaults to `warn`, or `debug` when `verbose` is set. `RUST_LOG` directives
/// take precedence over both.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| SqlError::Config(format!("failed to initialize logging: {e}")))
}
