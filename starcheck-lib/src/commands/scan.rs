use super::common::{ColorMode, LogLevel, init_logging, resolve_cache_dir};
use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::facts::hosting::GITHUB_GRAPHQL_ENDPOINT;
use crate::facts::{CollectOptions, Collector, RepoSpec, RetryConfig, YearRange};
use crate::reports::{ReportableRepo, generate_console, generate_json};
use crate::trust::compute_trust;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, Utc};
use clap::Parser;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::{Write, stderr, stdout};

const LOG_TARGET: &str = "      scan";

/// How long a run must last before the progress bar shows up.
const PROGRESS_DELAY: Duration = Duration::from_millis(300);

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Repository to analyze (format: `owner/repo` or a GitHub URL)
    #[arg(value_name = "REPO")]
    pub repo: RepoSpec,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Stargazers to sample from large repositories [default: 1000]
    #[arg(long, short = 's', value_name = "COUNT")]
    pub stars: Option<usize>,

    /// Scan every stargazer, however many there are
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Oldest year whose contributions are fetched [default: 2013]
    #[arg(long, value_name = "YEAR")]
    pub until_year: Option<i32>,

    /// Directory where API responses are cached
    #[arg(long, short = 'c', value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Path to configuration file (default is `starcheck.toml` in the current directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Show the percentiles and, when computed, the reports of the first and remaining stargazers
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Also write the report to a JSON file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// GraphQL endpoint to query
    #[arg(long, value_name = "URL", default_value = GITHUB_GRAPHQL_ENDPOINT, hide = true)]
    pub endpoint: String,
}

pub async fn scan_repository<H: Host>(host: &mut H, args: &ScanArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;
    let options = collect_options(args, &config, Utc::now().year())?;

    let token = args
        .github_token
        .as_deref()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| app_err!("a GitHub token is required, pass --github-token or set GITHUB_TOKEN"))?;

    let cache_dir = resolve_cache_dir(args.cache_dir.as_deref())?;
    log::info!(target: LOG_TARGET, "Caching responses in '{}'", cache_dir.display());

    // Logs and the progress bar would garble each other
    let delay = if args.log_level == LogLevel::None {
        PROGRESS_DELAY
    } else {
        Duration::from_secs(365 * 24 * 3600)
    };
    let progress = ProgressReporter::new(delay, args.color.use_colors(&stderr()));

    let mut collector = Collector::new(
        args.repo.clone(),
        token,
        &args.endpoint,
        &cache_dir,
        RetryConfig::default(),
        progress,
    )?;

    let sample = collector.collect(&options).await?;
    let trust = compute_trust(&sample, Utc::now())?;
    let reportable = ReportableRepo::new(&sample, trust);

    let mut console_output = String::new();
    generate_console(&reportable, args.verbose, args.color.use_colors(&stdout()), &mut console_output)?;
    let _ = write!(host.output(), "{console_output}");

    if let Some(path) = &args.json {
        let mut json_output = String::new();
        generate_json(&reportable, &mut json_output)?;
        fs::write(path, json_output).into_app_err_with(|| format!("writing JSON report to '{path}'"))?;
        log::info!(target: LOG_TARGET, "Wrote JSON report to '{path}'");
    }

    Ok(())
}

/// Merge command-line flags over the configuration file.
fn collect_options(args: &ScanArgs, config: &Config, current_year: i32) -> Result<CollectOptions> {
    let oldest = args.until_year.unwrap_or(config.until_year);

    Ok(CollectOptions {
        stars: args.stars.unwrap_or(config.stars),
        scan_all: args.all,
        years: YearRange::new(current_year, oldest)?,
        blacklist: config.blacklist(),
    })
}
