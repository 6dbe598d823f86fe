//! Log setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset, empty or unparsable
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter from a `RUST_LOG`-style directive string
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Log to stderr, filtered by `RUST_LOG`
///
/// stdout is left for command lines and JSON output.
pub fn init_logging() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(directives.as_deref()))
        .init();
}
