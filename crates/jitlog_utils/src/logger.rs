use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset. Phase reports are logged at
/// `info` under `jitlog::phase_times`.
pub const DEFAULT_FILTER: &str = "jitlog=info";

/// Install the tracing subscriber once per process.
///
/// Phase reports are multi-line, so events are written without targets in
/// the compact layout and the report table lands under its title.
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // another subscriber may already be installed by an embedding host
        let _ = fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .try_init();
    });
}
