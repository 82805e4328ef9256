//! Logging Module
//!
//! Configures the tracing subscriber for the host process. Console output is always
//! on; development builds additionally write JSON lines to a daily-rotated log file
//! and record panics in `exception.log`.

use std::any::Any;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, Environment};

/// Rotated files are named `application.<YYYY-MM-DD>.log`.
pub const LOG_FILE_PREFIX: &str = "application";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Days of rotated logs kept on disk.
pub const MAX_LOG_FILES: usize = 14;

/// Panic records, development only.
pub const EXCEPTION_LOG_FILE: &str = "exception.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Directory for rotated and exception logs, development only
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Derives logging settings from the server configuration.
    ///
    /// Production defaults to `warn` and console only; development defaults to
    /// `info` and also writes under `log_dir`.
    pub fn from_config(config: &Config) -> Self {
        let production = config.environment.is_production();
        let level = config
            .log_level
            .clone()
            .unwrap_or_else(|| if production { "warn" } else { "info" }.to_string());

        Self {
            environment: config.environment,
            level,
            log_dir: (!production).then(|| config.log_dir.clone()),
        }
    }

    pub fn exception_log(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(EXCEPTION_LOG_FILE))
    }
}

/// Opens a file for appending, creating its directory first.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Builds the daily-rotated application log writer inside `dir`.
pub fn rolling_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .context("Failed to create rolling log appender")
}

/// Installs the global subscriber and the panic hook.
///
/// A log directory that cannot be used is reported and skipped; it never stops startup.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_ansi(!config.environment.is_production());

    let mut file_error = None;
    let file_layer = config.log_dir.as_deref().and_then(|dir| match rolling_appender(dir) {
        Ok(appender) => Some(fmt::layer().json().with_ansi(false).with_writer(appender)),
        Err(e) => {
            file_error = Some(e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(e) = file_error {
        warn!("{:#}; logging to console only", e);
    }

    install_panic_hook(config.exception_log());

    match config.environment {
        Environment::Production => {
            info!("Production logging enabled, console output only");
        }
        Environment::Development => {
            info!("Development logging enabled, console and rotated file output");
        }
    }
    info!("Log level: {}", config.level);

    Ok(())
}

// == Panic Reporting ==
/// Routes panics through `tracing`, and also appends them to `exception_log` when set.
pub fn install_panic_hook(exception_log: Option<PathBuf>) {
    std::panic::set_hook(Box::new(move |info| {
        let report = describe_panic(info.payload(), info.location());
        error!(target: "panic", "{}", report);

        if let Some(path) = &exception_log {
            if let Err(e) = append_exception(path, &report) {
                eprintln!("Could not write {}: {}", path.display(), e);
            }
        }
    }));
}

/// One-line description of a panic payload and where it was raised.
pub fn describe_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");

    match location {
        Some(loc) => format!(
            "panicked at {}:{}:{}: {}",
            loc.file(),
            loc.line(),
            loc.column(),
            message
        ),
        None => format!("panicked: {}", message),
    }
}

/// Appends one JSON record for a panic report.
pub fn append_exception(path: &Path, report: &str) -> std::io::Result<()> {
    let record = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": "ERROR",
        "message": report,
    });
    let mut file = open_log_file(path)?;
    writeln!(file, "{}", record)
}
