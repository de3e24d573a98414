//! Process-wide logging setup shared by the API binary and tests.

pub mod logging;

pub use logging::LogFormat;

/// Initialize tracing/logging with the format chosen by `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    logging::init(LogFormat::from_env());
}
