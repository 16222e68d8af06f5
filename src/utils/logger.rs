use std::env;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global tracing subscriber once; the level comes from
/// `LOGLEVEL` (`INFO` when unset or invalid).
pub fn setup_logger() {
    INIT.call_once(|| {
        let level = env::var("LOGLEVEL").unwrap_or_else(|_| "INFO".to_string());
        let filter = EnvFilter::try_new(level.to_lowercase())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
