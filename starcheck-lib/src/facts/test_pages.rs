//! Canned response bodies and an offline page loader for unit tests.

use super::cache::{Cache, CacheKey, PageSuffix};
use super::hosting::Client;
use super::page_loader::PageLoader;
use super::retry_policy::{RetryConfig, RetryPolicy};
use serde_json::json;
use std::path::Path;

/// Nothing listens on the discard port, so any request fails fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:9/graphql";

pub fn login(position: usize) -> String {
    format!("user{position}")
}

pub fn cursor(position: usize) -> String {
    format!("cursor{position}")
}

/// A listing page holding the stargazers at `positions`.
pub fn listing_page(positions: core::ops::Range<usize>, has_next_page: Option<bool>) -> String {
    let edges: Vec<_> = positions.clone().map(|i| json!({ "cursor": cursor(i) })).collect();
    let nodes: Vec<_> = positions.map(|i| json!({ "login": login(i) })).collect();

    let mut stargazers = json!({ "edges": edges, "nodes": nodes });
    if let Some(has_next_page) = has_next_page {
        stargazers["pageInfo"] = json!({ "hasNextPage": has_next_page });
    }

    json!({
        "data": {
            "rateLimit": { "limit": 5000, "remaining": 4000, "resetAt": "2030-01-01T00:00:00Z" },
            "repository": { "stargazers": stargazers }
        }
    })
    .to_string()
}

/// A contribution page where every stargazer at `positions` made `calendar` contributions
/// and one of each other kind during the year.
pub fn contribution_page(positions: core::ops::Range<usize>, calendar: u64) -> String {
    let edges: Vec<_> = positions.clone().map(|i| json!({ "cursor": cursor(i) })).collect();
    let nodes: Vec<_> = positions
        .map(|i| {
            json!({
                "login": login(i),
                "createdAt": "2016-01-01T00:00:00Z",
                "contributionsCollection": {
                    "restrictedContributionsCount": 1,
                    "totalIssueContributions": 1,
                    "totalCommitContributions": 1,
                    "totalRepositoryContributions": 1,
                    "totalPullRequestContributions": 1,
                    "totalPullRequestReviewContributions": 1,
                    "contributionCalendar": { "totalContributions": calendar }
                }
            })
        })
        .collect();

    json!({
        "data": {
            "rateLimit": { "limit": 5000, "remaining": 4000, "resetAt": "2030-01-01T00:00:00Z" },
            "repository": { "stargazers": { "edges": edges, "nodes": nodes } }
        }
    })
    .to_string()
}

/// A loader whose network requests always fail, so only cached pages load.
pub fn offline_loader(dir: &Path) -> PageLoader {
    let config = RetryConfig {
        max_attempts: 1,
        ..RetryConfig::default()
    };

    PageLoader::new(
        "ullaakut/astronomer".parse().unwrap(),
        Cache::new(dir),
        Client::new("token", UNREACHABLE).unwrap(),
        RetryPolicy::new(config),
    )
}

pub fn seed(loader: &PageLoader, suffix: PageSuffix<'_>, body: &str) {
    let key = CacheKey::new(loader.repo(), UNREACHABLE, suffix);
    loader.cache().put(&key, body.as_bytes()).unwrap();
}
