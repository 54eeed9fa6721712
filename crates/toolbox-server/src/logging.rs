use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::configuration::LogSettings;

pub const LOG_FILE: &str = "mcpserver.log";

/// Appending writer for `<directory>/mcpserver.log`.
fn file_appender(directory: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(directory)
}

/// Install the global subscriber. Stdout carries the MCP transport, so
/// records only ever go to the log file; when it cannot be opened they are
/// discarded and startup continues.
///
/// The returned guard flushes pending records on drop and must be held for
/// the life of the process.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let (writer, guard) = match file_appender(&settings.directory) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        Err(err) => {
            eprintln!(
                "Failed to open {} in {}: {}",
                LOG_FILE,
                settings.directory.display(),
                err
            );
            (BoxMakeWriter::new(std::io::sink), None)
        }
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();
    if let Err(err) = installed {
        eprintln!("Logger already initialized: {}", err);
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_appender_writes_to_log_file() {
        let dir = TempDir::new().unwrap();
        let mut appender = file_appender(dir.path()).unwrap();
        appender.write_all(b"tool called\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert_eq!(contents, "tool called\n");
    }

    #[test]
    fn test_file_appender_appends() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOG_FILE), "earlier\n").unwrap();

        let mut appender = file_appender(dir.path()).unwrap();
        appender.write_all(b"later\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert_eq!(contents, "earlier\nlater\n");
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-directory");
        std::fs::write(&blocker, "").unwrap();

        assert!(file_appender(&blocker.join("logs")).is_err());
    }
}
