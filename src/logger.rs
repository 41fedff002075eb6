use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::AppResult;

/// Installs the global subscriber, appending to `log_file`.
///
/// Logs never go to the terminal so they cannot tear the dashboard.
///
/// # Errors
///
/// Returns an error when the log file cannot be opened.
pub fn init_logging(verbose: bool, log_file: &Path) -> AppResult<()> {
    let file = open_log_file(log_file)?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter(verbose))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
    Ok(())
}

fn env_filter(verbose: bool) -> EnvFilter {
    std::env::var("LOADPOOL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        )
}

fn open_log_file(path: &Path) -> AppResult<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn init_logging_is_idempotent() -> AppResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("loadtest.log");
        init_logging(false, &path)?;
        init_logging(true, &path)?;
        if !path.exists() {
            return Err(AppError::validation("Log file was not created"));
        }
        Ok(())
    }

    #[test]
    fn unwritable_log_path_is_an_error() -> AppResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join("loadtest.log");
        if open_log_file(&path).is_ok() {
            return Err(AppError::validation("Expected open failure"));
        }
        Ok(())
    }
}
