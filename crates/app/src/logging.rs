//! Process-wide logger setup for the binary.

use flexi_logger::{Logger, LoggerHandle, WriteMode};
use log::info;

/// Environment variable holding the log spec (`info`, `debug`, `services=debug`, ...).
pub const LOG_ENV: &str = "STUDY_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Starts logging to stderr. Keep the returned handle alive for the process lifetime.
///
/// # Errors
///
/// Returns a message if the level spec is invalid or the logger cannot start.
pub fn init() -> Result<LoggerHandle, String> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    let handle = Logger::try_with_str(&level)
        .map_err(|err| format!("invalid {LOG_ENV} value `{level}`: {err}"))?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start status=ok platform={} version={} level={level}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}
