//! Logging setup
//!
//! The library only emits `tracing` events; binaries and tests install a
//! subscriber with `init_tracing`. The filter comes from `RUST_LOG`, falling
//! back to `info`.

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber
///
/// Safe to call more than once: later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

/// Like `init_tracing`, but writes through the test harness's captured output
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}
