use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use svcdash_core::config::LoggingConfig;

const LOG_FILE: &str = "svcdash.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Where TUI logs go unless the config says otherwise
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("svcdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

pub fn log_dir(config: &LoggingConfig) -> PathBuf {
    config.dir.clone().unwrap_or_else(default_log_dir)
}

/// Logging for one-shot commands: human-readable, on stderr.
pub fn init_cli(config: &LoggingConfig) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(&config.filter));

    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Logging for TUI mode.
///
/// Everything goes to a daily-rolling file because the terminal is owned by
/// the renderer. Keep the returned guard alive until exit so buffered lines
/// are flushed.
pub fn init_tui(config: &LoggingConfig) -> Option<WorkerGuard> {
    let dir = log_dir(config);
    if let Err(e) = ensure_dir(&dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(env_filter(&config.filter));

    // No stderr layer: ratatui owns the terminal
    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    tracing::info!(dir = %dir.display(), "logging initialized (daily rolling)");
    Some(guard)
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
