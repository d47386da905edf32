//! Argument types and helpers shared between commands.

use crate::Result;
use camino::Utf8Path;
use clap::ValueEnum;
use directories::BaseDirs;
use ohno::IntoAppError;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to color output sent to `stream`.
    pub fn use_colors(self, stream: &impl IsTerminal) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stream.is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Initialize logger based on log level
///
/// `RUST_LOG` takes precedence over the requested level when set.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // Ignored when a logger is already installed
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// The cache directory to use: the one given, or `starcheck` under the platform cache directory.
pub fn resolve_cache_dir(cache_dir: Option<&Utf8Path>) -> Result<PathBuf> {
    if let Some(path) = cache_dir {
        return Ok(path.as_std_path().to_path_buf());
    }

    Ok(BaseDirs::new()
        .into_app_err("could not determine cache directory")?
        .cache_dir()
        .join("starcheck"))
}
