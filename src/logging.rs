use color_eyre::eyre::Result;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const DATA_DIR_ENV: &str = "SAFE_TERMINAL_DATA_DIR";
const LOG_FILE: &str = "safe-terminal.log";

/// Directory holding the log file: `$SAFE_TERMINAL_DATA_DIR`, else the
/// platform data dir.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

fn resolve_data_dir(overridden: Option<PathBuf>) -> PathBuf {
    overridden
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| dirs::data_local_dir().map(|dir| dir.join("safe-terminal")))
        .unwrap_or_else(|| PathBuf::from(".safe-terminal"))
}

fn create_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Routes `tracing` output to the log file. The terminal belongs to the UI,
/// so nothing is ever written to stdout or stderr.
pub fn init(debug: bool) -> Result<PathBuf> {
    let (path, log_file) = create_log_file(&data_dir())?;
    let level = if debug { "debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("safe_terminal={level},warn"))?,
    };

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(path)
}

/// Log a panic message and its location.
pub fn log_panic(panic: &std::panic::PanicHookInfo) {
    let msg = match panic.payload().downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match panic.payload().downcast_ref::<String>() {
            Some(s) => s.as_str(),
            None => "unknown panic payload",
        },
    };

    let location = panic.location().map_or_else(
        || "unknown location".to_string(),
        |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
    );

    error!("Panic occurred: {} at {}", msg, location);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_platform_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_data_dir(Some(dir.path().to_path_buf())), dir.path());
        assert_ne!(resolve_data_dir(Some(PathBuf::new())), PathBuf::new());
    }

    #[test]
    fn log_file_is_created_under_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let (path, _file) = create_log_file(&nested).unwrap();
        assert_eq!(path, nested.join(LOG_FILE));
        assert!(path.exists());
    }
}
