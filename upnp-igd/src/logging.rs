//! Logging setup for applications embedding the gateway layers
//!
//! Libraries in this workspace only emit `tracing` events; installing a
//! subscriber is left to the application through these helpers.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Output style of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber, events are dropped
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
    /// One JSON object per event, for log collectors
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Install a global subscriber for `mode`
///
/// # Environment Variables
///
/// - `GATEWAY_LOG_LEVEL`: filter directives (e.g. `info,upnp_igd=debug`)
/// - `RUST_LOG`: used when `GATEWAY_LOG_LEVEL` is not set
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .with(create_env_filter("info")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(create_env_filter("debug")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Json => Registry::default()
            .with(fmt::layer().json().with_current_span(false))
            .with(create_env_filter("info")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

/// Pick the mode from `GATEWAY_LOG_MODE` (`development`, `debug`, `json`), silent otherwise
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_env_value(
        std::env::var("GATEWAY_LOG_MODE").ok().as_deref(),
    ))
}

fn mode_from_env_value(value: Option<&str>) -> LoggingMode {
    match value.map(str::trim) {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        Some("json") => LoggingMode::Json,
        _ => LoggingMode::Silent,
    }
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = std::env::var("GATEWAY_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directives)
        .map_err(|e| LoggingError::InvalidFilter(format!("{}: {}", directives, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_mode_from_env_value() {
        assert_eq!(mode_from_env_value(Some("json")), LoggingMode::Json);
        assert_eq!(mode_from_env_value(Some("debug")), LoggingMode::Debug);
        assert_eq!(mode_from_env_value(Some("verbose")), LoggingMode::Silent);
        assert_eq!(mode_from_env_value(None), LoggingMode::Silent);
    }
}
