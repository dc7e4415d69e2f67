//! Telemetry and observability setup
//!
//! Configures structured logging with tracing and tracing-subscriber.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Build the default filter directive for a configured log level
///
/// Request spans from tower-http follow the same level as the service.
pub fn default_directive(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("roster={level},tower_http={level}")
}

/// Initialize tracing subscriber for structured logging
///
/// This can only be called once per process. Subsequent calls are silently ignored.
///
/// Reads log level from RUST_LOG environment variable, defaulting to the
/// level specified in config (or "info" if not set).
///
/// # Examples
///
/// ```no_run
/// roster::telemetry::init("info");
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_covers_service_and_http_layer() {
        assert_eq!(default_directive("INFO"), "roster=info,tower_http=info");
    }

    #[test]
    fn test_default_directive_parses_as_filter() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let directive = default_directive(level);
            assert!(
                EnvFilter::try_new(&directive).is_ok(),
                "directive should parse: {}",
                directive
            );
        }
    }
}
