//! Installs the global `tracing` subscriber for the binaries.

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Errors that stop logging from being set up.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("could not open the log file {path:?}: {source}")]
    OpenLogFile {
        /// The path that was given for the log file.
        path: PathBuf,
        /// Why the file could not be opened.
        source: io::Error,
    },

    /// A global subscriber has already been installed.
    #[error("could not install the logger: {0}")]
    Install(#[from] TryInitError),
}

/// Log to stderr, filtered by `RUST_LOG` or else `default_level`, and optionally append
/// everything at debug level and above to `log_file`.
pub fn setup_logging(default_level: &str, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(build_filter(default_level));

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenLogFile {
                    path: path.to_owned(),
                    source,
                })?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .try_init()?;

    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{LoggingError, setup_logging};

    #[test]
    fn unopenable_log_file_is_reported() {
        let path = Path::new("/this/directory/does/not/exist/debug.log");

        let result = setup_logging("info", Some(path));

        match result {
            Err(LoggingError::OpenLogFile { path: error_path, .. }) => {
                assert_eq!(error_path, path)
            }
            other => panic!("expected OpenLogFile, got {other:?}"),
        }
    }
}
