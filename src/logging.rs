use color_eyre::{Result, eyre::WrapErr};
use env_logger::{Env, Target};
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Overrides the log file location
pub const LOG_PATH_ENV_VAR: &str = "BALLOON_SHOOTER_LOG";
pub const DEFAULT_LOG_PATH: &str = "balloon-shooter.log";

pub fn log_path() -> PathBuf {
    std::env::var_os(LOG_PATH_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

/// Sends `log` output to a file, since the terminal belongs to the game.
///
/// The level defaults to `info`; `RUST_LOG` overrides it.
pub fn init() -> Result<PathBuf> {
    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .wrap_err("failed to install logger")?;

    Ok(path)
}
