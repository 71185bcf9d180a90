//! Tracing configuration and log routing.
//!
//! The server logs to stdout using a compact formatter and also appends to a log file. When
//! `FUZZYSERVE_LOG_FILE` is set, logs go to that path; otherwise they land in
//! `logs/fuzzyserve.log`. Setting `FUZZYSERVE_LOG_FILE=off` disables the file layer. A
//! non‑blocking writer keeps request handlers off the file I/O path.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_ENV: &str = "FUZZYSERVE_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "fuzzyserve.log";

/// Where file logs should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileTarget {
    Disabled,
    Explicit(PathBuf),
    Default,
}

impl FileTarget {
    fn from_env_value(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            None | Some("") => Self::Default,
            Some(value) if value.eq_ignore_ascii_case("off") => Self::Disabled,
            Some(value) => Self::Explicit(PathBuf::from(value)),
        }
    }
}

/// Configure tracing subscribers for stdout and optional file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact stdout layer and, when available, a file layer.
/// - Uses a global guard to keep the non‑blocking writer alive for the process lifetime.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let target = FileTarget::from_env_value(std::env::var(LOG_FILE_ENV).ok());
    if let Some(writer) = configure_file_writer(target) {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when file logging is disabled, the logs directory cannot be created, or the
/// target file cannot be opened.
fn configure_file_writer(target: FileTarget) -> Option<NonBlocking> {
    match target {
        FileTarget::Disabled => None,
        FileTarget::Explicit(path) => match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                let _ = LOG_GUARD.set(guard);
                Some(non_blocking)
            }
            Err(err) => {
                eprintln!("Failed to open log file {}: {err}", path.display());
                None
            }
        },
        FileTarget::Default => {
            if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
                eprintln!("Failed to create logs directory: {err}");
                return None;
            }
            let file_appender = tracing_appender::rolling::never(DEFAULT_LOG_DIR, DEFAULT_LOG_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
    }
}
