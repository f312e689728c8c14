use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::ToolsConfig;

const DEFAULT_FILTER: &str = "docsmith_tools=debug,docsmith_upload=debug";

/// Initializes logging to `~/.docsmith/logs` plus a compact stderr layer.
/// Returns a guard that must be kept alive for the duration of the process.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    let logs_dir = ToolsConfig::logs_dir()?;
    init_logging_to_dir(&logs_dir, &format!("{level},{DEFAULT_FILTER}"))
}

/// Initialize logging to a custom directory with a custom filter.
/// `RUST_LOG` takes precedence over `filter` when set.
pub fn init_logging_to_dir(logs_dir: &std::path::Path, filter: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    // File appender: daily rotation
    let file_appender = tracing_appender::rolling::daily(logs_dir, "docsmith");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_to_dir_creates_directory() {
        let tmp = tempfile::tempdir().expect("Failed to create tempdir");
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // The global subscriber can only be set once per process, so the
        // result may be an error; the directory must exist either way.
        let result = init_logging_to_dir(&logs_dir, "warn");
        assert!(logs_dir.exists());

        match result {
            Ok(guard) => drop(guard),
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("logging"), "unexpected error: {msg}");
            }
        }
    }

    #[test]
    fn test_env_filter_accepts_default_directives() {
        let filters = ["info", "debug", &format!("warn,{DEFAULT_FILTER}")];
        for f in filters {
            let filter = EnvFilter::try_new(f);
            assert!(filter.is_ok(), "bad filter {f}");
        }
    }
}
