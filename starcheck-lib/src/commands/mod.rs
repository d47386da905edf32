//! Command-line interface and orchestration for starcheck
//!
//! This module implements the CLI commands and drives the other modules to go from a
//! repository name to a rendered trust report.
//!
//! # Commands
//!
//! - **scan**: list the stargazers of a repository, sample them, fetch their
//!   contributions, score them and print the report
//! - **init**: generate a default configuration file
//! - **clear**: delete cached API responses for one repository or all of them
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. The `common` module holds the argument types and
//! helpers shared between commands, such as logging setup and color mode handling.
//!
//! Configuration comes from an optional `starcheck.toml` file. Command-line flags
//! take precedence over it.

mod clear;
mod common;
mod config;
mod host;
mod init;
mod progress_reporter;
mod run;
mod scan;

pub use clear::{ClearArgs, clear_cache};
pub use common::{ColorMode, LogLevel};
pub use config::Config;
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
pub use scan::{ScanArgs, scan_repository};
