//! Tracing subscriber setup

use std::path::Path;
use std::str::FromStr;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const DEFAULT_FILTER: &str = "themtube=debug,tower_http=debug";

const MAIN_LOG_PREFIX: &str = "them-tube-api";
const DETAILED_LOG_PREFIX: &str = "detailed.them-tube-api";
const LOG_SUFFIX: &str = "log";
const LOG_RETENTION_DAYS: usize = 31;

/// Output format of the console layer, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Keeps the background log writers alive; dropping it flushes pending lines.
#[must_use = "file logging stops when the guard is dropped"]
pub struct TelemetryGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// Daily-rotated, non-blocking writer for `{dir}/{prefix}.YYYY-MM-DD.log`.
fn rolling_writer(dir: &Path, prefix: &str) -> Result<(NonBlocking, WorkerGuard), InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(LOG_SUFFIX)
        .max_log_files(LOG_RETENTION_DAYS)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// `RUST_LOG` (default `themtube=debug,tower_http=debug`) filters everything.
/// Events go to the console, and with `log_directory` set also to an INFO
/// main log and a DEBUG detailed log, rotated daily and kept for 31 days.
pub fn init_telemetry(
    format: LogFormat,
    log_directory: Option<&Path>,
    service_name: &str,
    service_version: &str,
) -> Result<TelemetryGuard, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let console = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    let mut file_guards = Vec::new();
    let files = match log_directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (main, main_guard) = rolling_writer(dir, MAIN_LOG_PREFIX)?;
            let (detailed, detailed_guard) = rolling_writer(dir, DETAILED_LOG_PREFIX)?;
            file_guards.extend([main_guard, detailed_guard]);

            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(main)
                    .with_filter(LevelFilter::INFO)
                    .and_then(
                        fmt::layer()
                            .with_ansi(false)
                            .with_writer(detailed)
                            .with_filter(LevelFilter::DEBUG),
                    ),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(files)
        .try_init()?;

    tracing::info!(
        service.name = service_name,
        service.version = service_version,
        log_format = ?format,
        log_directory = ?log_directory,
        "Tracing initialized"
    );
    Ok(TelemetryGuard {
        _file_guards: file_guards,
    })
}
