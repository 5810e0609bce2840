//! One-time process startup.
//!
//! Installs the diagnostic subscriber and records the session settings.
//! Runs at most once per process; later calls return the first session.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingSection, SymwireConfig};
use crate::error::{Result, StartupError};

/// Settings fixed for the life of the process.
#[derive(Debug)]
pub struct Session {
    config: SymwireConfig,
}

impl Session {
    pub fn config(&self) -> &SymwireConfig {
        &self.config
    }
}

/// Keeps the log file writer alive; pending events are flushed on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

static SESSION: OnceLock<Session> = OnceLock::new();

/// Start the process with `config`. A second call is a no-op returning the
/// session established by the first.
pub fn init(config: SymwireConfig) -> Result<(&'static Session, LogGuard)> {
    if let Some(session) = SESSION.get() {
        return Ok((session, LogGuard { _worker: None }));
    }
    let worker = init_logging(&config.logging)?;
    let session = SESSION.get_or_init(|| Session { config });
    tracing::debug!(engine = %session.config.engine.name, "session started");
    Ok((session, LogGuard { _worker: worker }))
}

fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| StartupError::Logging(format!("invalid level '{level}': {e}"))),
    }
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StartupError::Logging(format!("log file {path:?} has no file name")))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), guard))
}

/// Install the global subscriber. Stdout is never written to.
fn init_logging(logging: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let filter = filter(&logging.level)?;
    let (writer, guard) = match &logging.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(logging.file.is_none());

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
        LogFormat::Pretty => registry.with(fmt_layer).try_init(),
    }
    .map_err(|e| StartupError::Logging(e.to_string()))?;

    Ok(guard)
}
