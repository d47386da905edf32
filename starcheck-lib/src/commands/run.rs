//! Command dispatch logic for starcheck

use super::{ClearArgs, InitArgs, ScanArgs, clear_cache, init_config, scan_repository};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "starcheck", version, author, long_about = None)]
#[command(about = "Estimate whether a GitHub repository's stars were organically earned")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: StarcheckSubcommand,
}

#[derive(Subcommand, Debug)]
enum StarcheckSubcommand {
    /// Analyze the stargazers of a repository and report how trustworthy they look
    Scan(Box<ScanArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Delete cached API responses
    Clear(ClearArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if the executed command fails. Invalid arguments make clap print
/// usage information and exit the process.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        StarcheckSubcommand::Scan(scan_args) => scan_repository(host, scan_args).await,
        StarcheckSubcommand::Init(init_args) => init_config(host, init_args),
        StarcheckSubcommand::Clear(clear_args) => clear_cache(host, clear_args),
    }
}
