//! Logging system configuration and initialization
//!
//! - Configuration file based log level control, overridable with `RUST_LOG`
//! - Console output on stderr so records printed to stdout stay parseable
//! - Optional file output (non-blocking writer) and JSON formatting
//! - UTC timestamps
//! - Log files stored relative to executable location

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::Utc;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Subscriber, info, warn};
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Dependency targets that are only interesting at trace level
const QUIET_TARGETS: &[(&str, &str)] = &[
    ("reqwest", "info"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("h2", "warn"),
    ("rustls", "warn"),
    ("html5ever", "warn"),
    ("selectors", "warn"),
    ("tokio", "info"),
];

struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LoggingConfig::default())
}

/// Filter for the configured level; `RUST_LOG` takes precedence when set
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for (target, level) in QUIET_TARGETS {
            filter = filter.add_directive(format!("{target}={level}").parse()?);
        }
    }

    for (module, level) in &config.module_filters {
        filter = filter.add_directive(
            format!("{module}={level}")
                .parse()
                .map_err(|e| anyhow!("Invalid module filter {}={}: {}", module, level, e))?,
        );
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// ```bash
/// # Show HTTP client details while keeping the crate at debug
/// RUST_LOG="debug,reqwest=debug,hyper=debug" aip-ops-scraper lookup EVRA
/// ```
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(&config)?;
    let log_dir = get_log_directory();

    let file_writer = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;
        if config.auto_cleanup_logs {
            cleanup_old_logs(&log_dir, config.max_files)?;
        }

        let file_appender = rolling::never(&log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);
        Some(file_writer)
    } else {
        None
    };

    build_subscriber(&config, env_filter, file_writer).try_init()?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }
    Ok(())
}

/// Plain stderr layer, stacked next to a file layer when console output is on
fn console_layer<S>(enabled: bool) -> Option<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    enabled.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(UtcTimeFormatter)
            .with_target(false)
    })
}

/// Subscriber stack for `config`, writing to `file_writer` when file output is on
fn build_subscriber(
    config: &LoggingConfig,
    env_filter: EnvFilter,
    file_writer: Option<NonBlocking>,
) -> Box<dyn Subscriber + Send + Sync> {
    let registry = Registry::default().with(env_filter);

    match (file_writer, config.json_format) {
        (Some(writer), true) => {
            let file_layer = fmt::Layer::new()
                .json()
                .with_writer(writer)
                .with_timer(UtcTimeFormatter)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            Box::new(registry.with(file_layer).with(console_layer(config.console_output)))
        }
        (Some(writer), false) => {
            let file_layer = fmt::Layer::new()
                .with_writer(writer)
                .with_timer(UtcTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            Box::new(registry.with(file_layer).with(console_layer(config.console_output)))
        }
        (None, true) => {
            let layer = fmt::Layer::new()
                .json()
                .with_writer(std::io::stderr)
                .with_timer(UtcTimeFormatter)
                .with_target(true);
            Box::new(registry.with(layer))
        }
        (None, false) => {
            let layer = fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_timer(UtcTimeFormatter)
                .with_target(false);
            Box::new(registry.with(layer))
        }
    }
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== AIP Ops Scraper System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    info!("Log directory: {:?}", get_log_directory());
}

/// Keep the newest `max_files` log files, delete the rest
pub fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path.extension().is_some_and(|ext| ext == "log");
        if path.is_file() && is_log {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_creation() {
        let log_dir = get_log_directory();
        assert!(log_dir.to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_env_filter_accepts_module_filters() {
        let mut config = LoggingConfig::default();
        config
            .module_filters
            .insert("aip_ops_scraper_lib::application".into(), "debug".into());
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_every_output_combination_builds_a_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        for (json, console) in [(false, true), (false, false), (true, true), (true, false)] {
            let config = LoggingConfig {
                json_format: json,
                console_output: console,
                file_output: true,
                ..LoggingConfig::default()
            };
            let name = format!("combo-{json}-{console}.log");
            let (writer, guard) = non_blocking(rolling::never(dir.path(), &name));
            let subscriber = build_subscriber(&config, EnvFilter::new("info"), Some(writer));
            tracing::subscriber::with_default(subscriber, || info!("lookup finished for EVRA"));
            drop(guard);

            let written = std::fs::read_to_string(dir.path().join(&name)).unwrap();
            assert!(written.contains("lookup finished for EVRA"), "{name}: {written}");
        }

        for json in [true, false] {
            let config = LoggingConfig {
                json_format: json,
                file_output: false,
                ..LoggingConfig::default()
            };
            let subscriber = build_subscriber(&config, EnvFilter::new("info"), None);
            tracing::subscriber::with_default(subscriber, || info!("console only"));
        }
    }

    #[test]
    fn test_no_output_is_rejected() {
        let config = LoggingConfig {
            file_output: false,
            console_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(config).is_err());
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..4 {
            let path = dir.path().join(format!("run-{i}.log"));
            std::fs::write(&path, "x").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(15));
        }
        std::fs::write(dir.path().join("notes.txt"), "kept").unwrap();

        let removed = cleanup_old_logs(dir.path(), 2).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("run-3.log").exists());
        assert!(dir.path().join("run-2.log").exists());
        assert!(!dir.path().join("run-0.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
