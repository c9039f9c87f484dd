//! Tracing subscriber setup
//!
//! The library itself only emits `tracing` events. Applications that want
//! them printed can call [`init_logging`] once at startup, or install their
//! own subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Result, ToolboxError};

/// Install a global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns [`ToolboxError::Config`] if the filter directive is invalid or a
/// global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use toolbox_transport::config::LoggingConfig;
/// use toolbox_transport::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "toolbox_transport=debug".to_string(),
///     json_format: true,
/// };
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ToolboxError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json_format {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);
        registry.with(layer).try_init()
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true);
        registry.with(layer).try_init()
    };

    installed.map_err(|e| {
        ToolboxError::Config(format!("Failed to install tracing subscriber: {}", e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_second_init_fails_without_panicking() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }

    #[test]
    #[serial]
    fn test_invalid_level_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "toolbox_transport=loud".to_string(),
            json_format: false,
        };
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolboxError>(),
            Some(ToolboxError::Config(_))
        ));
    }
}
