//! Arguments and logging setup shared by the commands.

use crate::Result;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use ohno::IntoAppError;
use std::fs::OpenOptions;

/// Log level for diagnostic output
///
/// The numeric aliases follow the `LOG_LEVEL` convention of `0` (silent),
/// `1` (informational), and `2` (debug).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    #[value(alias = "0")]
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    #[value(alias = "1")]
    Info,

    /// Debug, info, warning, and error messages
    #[value(alias = "2")]
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that talks to the network
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `repo-score.toml` in the current directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", env = "LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Append diagnostic output to this file instead of stderr
    #[arg(long, value_name = "PATH", env = "LOG_FILE")]
    pub log_file: Option<Utf8PathBuf>,

    /// Root of the GitHub REST API
    #[arg(long, value_name = "URL", hide = true)]
    pub api_url: Option<String>,

    /// Root of the npm registry
    #[arg(long, value_name = "URL", hide = true)]
    pub npm_registry_url: Option<String>,
}

/// Initialize the logger for `log_level`, writing to `log_file` when given.
///
/// Only the first initialization in a process takes effect.
pub fn init_logging(log_level: LogLevel, log_file: Option<&Utf8PathBuf>) -> Result<()> {
    let level = match log_level {
        LogLevel::None => return Ok(()),
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    let mut builder = env_logger::Builder::from_env(env);
    let _ = builder
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .into_app_err_with(|| format!("opening log file '{path}'"))?;
        let _ = builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        let _ = builder.format_timestamp(None);
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }

    Ok(())
}
