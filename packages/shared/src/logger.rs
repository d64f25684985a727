//! Logging setup utilities for the linechat binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the calling crate and the binary get `default_log_level`; `RUST_LOG`
/// overrides the whole filter when set.
///
/// # Arguments
///
/// * `crate_name` - The library crate to enable (e.g., "linechat_server")
/// * `binary_name` - The name of the binary (e.g., "linechat-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use linechat_shared::logger::setup_logger;
///
/// setup_logger("linechat_server", "linechat-server", "info");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(crate_name, binary_name, default_log_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the `EnvFilter` directive used when `RUST_LOG` is not set.
fn default_filter(crate_name: &str, binary_name: &str, level: &str) -> String {
    format!(
        "{}={},{}={}",
        crate_name.replace('-', "_"),
        level,
        binary_name.replace('-', "_"),
        level
    )
}
