//! Logging infrastructure for sideload.
//!
//! Structured logging is controlled by the `SIDELOAD_DEBUG` environment variable.
//!
//! # Environment Variables
//!
//! - `SIDELOAD_DEBUG=true` - Enable debug logging
//! - `SIDELOAD_DEBUG=1` - Enable debug logging
//! - `SIDELOAD_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `SIDELOAD_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use sideload_core::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! Within the crate, registry misses and discovered resources are logged with
//! `debug!`, individual walk steps with `trace!`.

use std::env;
use std::sync::{Once, OnceLock};

static INIT: Once = Once::new();
static TRACE_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if debug logging is enabled via `SIDELOAD_DEBUG`.
///
/// Returns `true` if `SIDELOAD_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIDELOAD_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Whether [`sideload_trace!`](crate::sideload_trace) emits events.
///
/// Reads `SIDELOAD_DEBUG` once per process.
#[inline]
pub fn is_trace_enabled() -> bool {
    *TRACE_ENABLED.get_or_init(is_debug_enabled)
}

/// Get the configured log level from `SIDELOAD_LOG_LEVEL`.
///
/// Defaults to "debug" if `SIDELOAD_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("SIDELOAD_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `SIDELOAD_LOG_FORMAT`.
///
/// Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("SIDELOAD_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the sideload logging system.
///
/// Subsequent calls are no-ops. Without the `tracing-subscriber` feature this
/// installs nothing and events go to whatever subscriber the host configured.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SIDELOAD_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("sideload={},sideload_core={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "sideload logging initialized"
            );
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("SIDELOAD_LOG_LEVEL", level);
    }
    init();
}

/// Trace logging gated on `SIDELOAD_DEBUG`, read once per process.
#[macro_export]
macro_rules! sideload_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_trace_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_disabled_by_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var("SIDELOAD_DEBUG");
        }
        assert!(!is_debug_enabled());
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var("SIDELOAD_DEBUG");
            env::remove_var("SIDELOAD_LOG_LEVEL");
        }
        assert_eq!(get_log_level(), "warn");
    }

    #[test]
    fn test_trace_flag_is_cached() {
        let enabled = is_trace_enabled();
        assert_eq!(TRACE_ENABLED.get(), Some(&enabled));
        assert_eq!(is_trace_enabled(), enabled);
    }
}
