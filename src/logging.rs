//! Tracing subscriber setup for applications embedding the engine.
//!
//! The library only emits events; nothing is printed until the host calls
//! [`init`] or installs its own subscriber.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "carteles=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, or `carteles=info`.
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Install a fmt subscriber with a fallback filter directive.
///
/// Returns false when a global subscriber was already set.
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
