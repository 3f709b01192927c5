//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/nativefire/logs/`. With `verbose`
/// set, debug output is mirrored to stderr as well.
/// Log level is controlled by the `NATIVEFIRE_LOG` environment variable.
///
/// # Examples
/// ```bash
/// NATIVEFIRE_LOG=debug nativefire configure
/// NATIVEFIRE_LOG=trace nativefire configure
/// ```
pub fn init(verbose: bool) -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "nativefire.log");

    let default_filter = if verbose {
        "nativefire=debug,nativefire_core=debug,nativefire_firebase=debug,nativefire_app=debug,warn"
    } else {
        "nativefire=info,nativefire_core=info,nativefire_firebase=info,nativefire_app=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_env("NATIVEFIRE_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .with(stderr_layer)
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("nativefire starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Directory holding the rolling log files
///
/// `<local data dir>/nativefire/logs`, or `./nativefire/logs` when the
/// platform has no local data directory.
pub fn log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("nativefire").join("logs")
}
