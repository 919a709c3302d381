//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production
//! environments: pretty console output while developing, JSON in production,
//! optionally copied into daily-rotated files with a retention sweep.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*};

use crate::core::error::AppResult;

/// Rotated file prefix; daily files are `stockroom-server.YYYY-MM-DD`
const LOG_FILE_PREFIX: &str = "stockroom-server";

/// Days a rotated log file is kept before the sweep removes it
const LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> AppResult<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize the logging system with optional daily-rotated file output
///
/// # Arguments
/// * `level` - Fallback log level when `RUST_LOG` is unset (e.g., "info")
/// * `json_format` - JSON output (production) instead of pretty (development)
/// * `log_dir` - Optional directory for rotated log files
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(appender));

            tokio::spawn(periodic_cleanup(dir.to_path_buf()));
            Some(layer)
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(console_layer).init();
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(console_layer).init();
    }

    Ok(())
}

/// Delete rotated log files older than the retention window.
///
/// Returns how many files were removed.
pub fn cleanup_old_logs(log_dir: &Path) -> std::io::Result<u64> {
    use chrono::{Local, NaiveDate, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // The daily appender names files `{prefix}.{YYYY-MM-DD}`
        let Some(date_part) = name.strip_prefix(LOG_FILE_PREFIX).and_then(|r| r.strip_prefix('.'))
        else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
            continue;
        };
        let midnight = match date.and_hms_opt(0, 0, 0) {
            Some(t) => t,
            None => continue,
        };
        if let Some(file_day) = Local.from_local_datetime(&midnight).single()
            && file_day < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

/// Hourly retention sweep over the log directory
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
