//! Tracing setup.
//!
//! The crate logs through `tracing` and never installs a subscriber on its
//! own. Hosts that have no subscriber of their own can call
//! [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set and valid, otherwise `fallback`.
///
/// An unparsable `fallback` falls back further to `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_logging(fallback: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(true)
        .try_init()
        .is_ok()
}
