use super::cache::{Cache, CacheKey, PageSuffix};
use super::hosting::{Client, GraphQlResponse, HostingApiResult, Stargazers};
use super::repo_spec::RepoSpec;
use super::retry_policy::{Attempt, Quota, RetryPolicy};
use crate::Result;
use bytes::Bytes;
use chrono::Utc;

const LOG_TARGET: &str = "     pages";

/// Loads pages of a repository's stargazers, from the cache when possible.
///
/// A cached body is trusted as-is. A body that no longer decodes is treated as
/// corruption: the entry is dropped and the page is fetched again. Fetched bodies
/// are cached only once they decoded without error.
#[derive(Debug)]
pub struct PageLoader {
    repo: RepoSpec,
    cache: Cache,
    client: Client,
    policy: RetryPolicy,
}

impl PageLoader {
    #[must_use]
    pub const fn new(repo: RepoSpec, cache: Cache, client: Client, policy: RetryPolicy) -> Self {
        Self {
            repo,
            cache,
            client,
            policy,
        }
    }

    #[must_use]
    pub const fn repo(&self) -> &RepoSpec {
        &self.repo
    }

    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Load the page identified by `suffix`, posting `query` if it is not cached.
    pub async fn load(&mut self, suffix: PageSuffix<'_>, query: &str) -> Result<Stargazers> {
        let key = CacheKey::new(&self.repo, self.client.endpoint(), suffix);

        if let Some(body) = self.cache.get(&key)? {
            match GraphQlResponse::parse(&body).and_then(GraphQlResponse::into_stargazers) {
                Ok(stargazers) => return Ok(stargazers),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Discarding corrupt cache entry {key}: {e:#}");
                    self.cache.remove(&key)?;
                }
            }
        }

        let target = format!("{} ({})", self.client.endpoint(), describe(suffix));
        let client = &self.client;
        let (stargazers, body) = self
            .policy
            .execute(&target, || async move { classify(client.post(query).await) })
            .await?;

        self.cache.put(&key, &body)?;
        Ok(stargazers)
    }
}

fn describe(suffix: PageSuffix<'_>) -> String {
    match suffix {
        PageSuffix::Listing(None) => "first listing page".to_string(),
        PageSuffix::Listing(Some(cursor)) => format!("listing page after cursor {cursor}"),
        PageSuffix::Contributions(None, year) => format!("first contribution page for {year}"),
        PageSuffix::Contributions(Some(cursor), year) => format!("contribution page after cursor {cursor} for {year}"),
    }
}

fn classify(result: HostingApiResult) -> Attempt<(Stargazers, Bytes)> {
    match result {
        HostingApiResult::Success(body, rate_limit) => {
            let response = match GraphQlResponse::parse(&body) {
                Ok(response) => response,
                Err(e) => return Attempt::Transient(e),
            };

            let quota = response.quota().or_else(|| {
                rate_limit.and_then(|info| {
                    info.limit.map(|limit| Quota {
                        limit,
                        remaining: info.remaining,
                        reset_at: info.reset_at,
                    })
                })
            });

            if response.is_rate_limited() {
                let reset_at = rate_limit
                    .map(|info| info.reset_at)
                    .or_else(|| quota.map(|q| q.reset_at))
                    .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));
                return Attempt::RateLimited(reset_at);
            }

            match response.into_stargazers() {
                Ok(stargazers) => Attempt::Data((stargazers, body), quota),
                Err(e) => Attempt::Fatal(e),
            }
        }
        HostingApiResult::RateLimited(reset_at) => Attempt::RateLimited(reset_at),
        HostingApiResult::Transient(e) => Attempt::Transient(e),
        HostingApiResult::Failed(e) => Attempt::Fatal(e),
    }
}
