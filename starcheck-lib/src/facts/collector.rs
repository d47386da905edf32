use super::cache::Cache;
use super::contributions::{YearRange, fetch_contributions};
use super::hosting::Client;
use super::page_loader::PageLoader;
use super::progress::Progress;
use super::repo_spec::RepoSpec;
use super::retry_policy::{RetryConfig, RetryPolicy};
use super::sampling::{Blacklist, select_pages};
use super::stargazers::list_stargazers;
use super::user_record::UserRecord;
use crate::{HashMap, Result};
use ohno::IntoAppError;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const LOG_TARGET: &str = " collector";

/// Below this many stargazers, the trust estimate gets noisy.
const RELIABLE_POPULATION: usize = 1000;

/// What to collect.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// How many stargazers to sample from large populations.
    pub stars: usize,

    /// Scan every stargazer regardless of `stars`.
    pub scan_all: bool,

    pub years: YearRange,
    pub blacklist: Blacklist,
}

/// The stargazers collected for one repository.
#[derive(Debug, Clone)]
pub struct Sample {
    pub repo: RepoSpec,

    /// Sampled users, in listing order, each tagged with their listing position.
    pub users: Vec<UserRecord>,

    /// Number of stargazers the repository has.
    pub population: usize,

    /// Whether every reachable stargazer was scanned.
    pub exhaustive: bool,
}

/// Gathers stargazer data for a repository
pub struct Collector {
    loader: PageLoader,
    progress: Arc<dyn Progress>,
}

impl core::fmt::Debug for Collector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collector")
            .field("loader", &self.loader)
            .field("progress", &"<dyn Progress>")
            .finish()
    }
}

impl Collector {
    /// Prepare a collector for `repo` that caches responses under `cache_dir`.
    pub fn new(
        repo: RepoSpec,
        github_token: &str,
        endpoint: &str,
        cache_dir: impl AsRef<Path>,
        retry: RetryConfig,
        progress: impl Progress + 'static,
    ) -> Result<Self> {
        let progress: Arc<dyn Progress> = Arc::new(progress);
        progress.set_phase("Preparing");

        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir).into_app_err_with(|| format!("unable to create cache directory '{}'", cache_dir.display()))?;

        let loader = PageLoader::new(
            repo,
            Cache::new(cache_dir),
            Client::new(github_token, endpoint)?,
            RetryPolicy::new(retry),
        );

        Ok(Self { loader, progress })
    }

    /// List, sample, and fetch the stargazers of the repository.
    pub async fn collect(&mut self, options: &CollectOptions) -> Result<Sample> {
        let result = self.collect_inner(options).await;
        self.progress.done();
        result
    }

    async fn collect_inner(&mut self, options: &CollectOptions) -> Result<Sample> {
        let index = list_stargazers(&mut self.loader, self.progress.as_ref()).await?;
        let population = index.len();

        if population < RELIABLE_POPULATION {
            log::warn!(
                target: LOG_TARGET,
                "{} has only {population} stargazers, the trust estimate may be inaccurate",
                self.loader.repo()
            );
        }

        self.progress.set_phase("Sampling");
        let selection = select_pages(&index, options.stars, options.scan_all, &options.blacklist)?;
        log::info!(
            target: LOG_TARGET,
            "Fetching {} pages of stargazers over {} years",
            selection.pages.len(),
            options.years.len()
        );

        let records = fetch_contributions(&mut self.loader, &selection.pages, options.years, self.progress.as_ref()).await?;

        let positions: HashMap<&str, usize> = index
            .entries()
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.login.as_str(), position))
            .collect();

        let mut users = records.into_vec();
        for user in &mut users {
            user.position = positions.get(user.login.as_str()).copied();
            if user.position.is_none() {
                log::debug!(target: LOG_TARGET, "{} is missing from the stargazer listing", user.login);
            }
        }

        Ok(Sample {
            repo: self.loader.repo().clone(),
            users,
            population,
            exhaustive: selection.exhaustive,
        })
    }
}
