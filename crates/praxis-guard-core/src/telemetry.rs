//! Log output for the `praxis-guard` binary.
//!
//! Check runs are driven from CI jobs and webhook replays, so everything the
//! engine logs goes to stderr and stdout carries only the verdict.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Route `tracing` events from the engine, reporter and GitHub client to stderr.
///
/// `level` is the floor for every target unless `RUST_LOG` overrides it,
/// e.g. `RUST_LOG=praxis_guard_github=debug` to see pagination. `json`
/// switches to one JSON object per event for log shippers. A subscriber
/// installed earlier in the process is left in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}
