//! Logging setup
//!
//! Library code emits `tracing` events; the binary installs a subscriber once
//! at startup. `--debug` lowers the level to `debug`, `RUST_LOG` still wins
//! for targeted filtering.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(debug: bool) {
    if DEBUG_ENABLED.set(debug).is_err() {
        return;
    }

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber installed by an embedding program takes precedence
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Debug-level event, shorthand for `tracing::debug!`
///
/// Usage: `debug!("message with {}", variable)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}
