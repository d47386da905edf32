//! Data collection for a repository's stargazers
//!
//! This module is responsible for acquiring stargazer data from GitHub's GraphQL API
//! reliably under a hard external rate limit.
//!
//! # Implementation Model
//!
//! The pipeline is driven by the [`Collector`] and runs strictly sequentially, one
//! request at a time, so that the rate-limit bookkeeping stays exact:
//!
//! 1. **Listing**: [`list_stargazers`] pages through the full stargazer list with a cheap
//!    query and builds an ordered [`StargazerIndex`] of logins and cursors.
//! 2. **Sampling**: [`select_pages`] decides which pages of stargazers to fetch detailed
//!    data for: everything, or a deterministic first stratum plus a random one.
//! 3. **Fetching**: [`fetch_contributions`] walks every selected page year by year and
//!    merges the partial answers into per-user [`UserRecord`]s.
//!
//! Every response body goes through the [`PageLoader`], which consults the on-disk
//! [`Cache`] first and otherwise issues the request through a [`RetryPolicy`]. Because
//! every successful page is cached, an interrupted scan resumes where it stopped.

mod cache;
mod collector;
mod contributions;
pub mod hosting;
mod page_loader;
mod path_utils;
mod progress;
mod repo_spec;
mod retry_policy;
mod sampling;
mod stargazers;
#[cfg(test)]
mod test_pages;
mod user_record;

pub use cache::{Cache, CacheKey, CacheScope, PageSuffix};
pub use collector::{CollectOptions, Collector, Sample};
pub use contributions::{CONTRIBUTION_PAGE_SIZE, YearRange, fetch_contributions};
pub use page_loader::PageLoader;
pub use progress::Progress;
pub use repo_spec::RepoSpec;
pub use retry_policy::{Attempt, Quota, RetryConfig, RetryPolicy, RetryState, Step};
pub use sampling::{
    Blacklist, FIRST_STRATUM_USERS, PageRef, SMALL_POPULATION_THRESHOLD, Selection, boundary_cursors, select_pages,
};
pub use stargazers::{LIST_PAGE_SIZE, StargazerCursor, StargazerIndex, list_stargazers};
pub use user_record::{Contributions, UserRecord, UserRecords};
