//! Rolling file logs for the core and its hosts.
//!
//! # Invariants
//! - At most one logger per process; a repeated call with identical settings
//!   is a no-op and a call with different settings is rejected.
//! - Initialization never panics.
//! - Events are metadata only (`event=... module=... status=...`); order notes,
//!   names and addresses are never logged.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "dineflow";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SUMMARY_MAX_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Level and directory of the process logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDir(String),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(String),
    /// A logger with different settings is already running.
    AlreadyInitialized { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDir(message) => write!(f, "{message}"),
            Self::CreateDir { dir, source } => {
                write!(f, "failed to create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::AlreadyInitialized { active } => write!(
                f,
                "logging already initialized at `{}` with level `{}`",
                active.log_dir.display(),
                active.level
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Starts rotating file logs under `log_dir` (absolute path).
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let requested = LogSettings {
        level: parse_level(level)?,
        log_dir: parse_log_dir(log_dir)?,
    };

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(&requested))?;
    if active.settings != requested {
        return Err(LoggingError::AlreadyInitialized {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

/// Settings of the running logger, `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE_LOGGER.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.log_dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=core_init module=logging status=ok level={} os={} version={}",
        settings.level,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    let normalized = level.trim().to_ascii_lowercase();
    let parsed = match normalized.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => return Err(LoggingError::UnsupportedLevel(normalized)),
    };
    Ok(parsed)
}

fn parse_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidDir("log_dir cannot be empty".to_string()));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidDir(format!(
            "log_dir must be an absolute path, got `{trimmed}`"
        )));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={location} payload={}",
            one_line_summary(&payload, PANIC_SUMMARY_MAX_CHARS)
        );
        previous(panic_info);
    }));
}

/// Flattens line breaks and caps the length so one event stays on one line.
fn one_line_summary(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut summary: String = flattened.chars().take(max_chars).collect();
    summary.push_str("...");
    summary
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line_summary, parse_level, parse_log_dir};
    use super::LoggingError;
    use std::path::PathBuf;

    #[test]
    fn parse_level_accepts_aliases() {
        assert_eq!(parse_level(" WARNING ").expect("warning is an alias"), "warn");
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn parse_log_dir_requires_absolute_path() {
        assert!(matches!(
            parse_log_dir("logs/kitchen"),
            Err(LoggingError::InvalidDir(_))
        ));
        assert!(matches!(parse_log_dir("  "), Err(LoggingError::InvalidDir(_))));
    }

    #[test]
    fn summary_is_single_line_and_capped() {
        assert_eq!(one_line_summary("a\nb", 10), "a b");
        assert_eq!(one_line_summary("abcdefghij", 4), "abcd...");
    }

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dineflow-logging-{label}-{}", std::process::id()))
    }

    #[test]
    fn init_logging_rejects_different_settings() {
        let first = scratch_dir("first");
        let second = scratch_dir("second");
        let first_dir = first.to_str().expect("utf-8 path").to_string();
        let second_dir = second.to_str().expect("utf-8 path").to_string();

        init_logging("info", &first_dir).expect("first init");
        init_logging("INFO", &first_dir).expect("same settings are a no-op");

        assert!(matches!(
            init_logging("debug", &first_dir),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging("info", &second_dir),
            Err(LoggingError::AlreadyInitialized { .. })
        ));

        let active = logging_status().expect("logger is running");
        assert_eq!(active.level, "info");
        assert_eq!(active.log_dir, first);
    }
}
