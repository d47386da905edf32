//! Models for GraphQL response bodies.
//!
//! Only the fields the queries ask for are modeled. Fields that appear in one query
//! but not the other are optional so the same models decode both.

use crate::Result;
use crate::facts::Quota;
use chrono::{DateTime, Utc};
use ohno::{IntoAppError, bail};
use serde::Deserialize;

/// Error type GitHub reports when the query quota is exhausted.
const RATE_LIMITED: &str = "RATE_LIMITED";

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,

    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub rate_limit: Option<RateLimit>,
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimit {
    #[must_use]
    pub const fn quota(&self) -> Quota {
        Quota {
            limit: self.limit,
            remaining: self.remaining,
            reset_at: self.reset_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub stargazers: Stargazers,
}

/// One page of a repository's stargazer connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stargazers {
    /// Absent from bodies cached before the query asked for it.
    pub page_info: Option<PageInfo>,

    #[serde(default)]
    pub edges: Vec<Edge>,

    #[serde(default)]
    pub nodes: Vec<Stargazer>,
}

impl Stargazers {
    /// The cursor of the last stargazer on this page.
    #[must_use]
    pub fn last_cursor(&self) -> Option<&str> {
        self.edges.last().map(|edge| edge.cursor.as_str())
    }

    #[must_use]
    pub fn has_next_page(&self) -> Option<bool> {
        self.page_info.map(|info| info.has_next_page)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge {
    pub cursor: String,
}

/// A stargazer as returned by either query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stargazer {
    pub login: String,
    pub created_at: Option<DateTime<Utc>>,
    pub contributions_collection: Option<ContributionsCollection>,
}

/// One year's worth of a stargazer's contribution counters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[expect(clippy::struct_field_names, reason = "field names match GitHub API exactly")]
pub struct ContributionsCollection {
    pub restricted_contributions_count: u64,
    pub total_issue_contributions: u64,
    pub total_commit_contributions: u64,
    pub total_repository_contributions: u64,
    pub total_pull_request_contributions: u64,
    pub total_pull_request_review_contributions: u64,
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: String,
}

impl GraphQlResponse {
    /// Decode a response body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).into_app_err("decoding GraphQL response")
    }

    /// Whether the server refused the query because the quota is exhausted.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.errors.iter().any(|e| e.kind.as_deref() == Some(RATE_LIMITED))
    }

    /// The quota reported in the body, if any.
    #[must_use]
    pub fn quota(&self) -> Option<Quota> {
        self.data.as_ref()?.rate_limit.as_ref().map(RateLimit::quota)
    }

    /// Extract the stargazer page, failing on any structured error.
    pub fn into_stargazers(self) -> Result<Stargazers> {
        if let Some(error) = self.errors.first() {
            let kind = error.kind.as_deref().unwrap_or("UNKNOWN");
            bail!("GraphQL query failed with {kind}: {}", error.message);
        }

        match self.data.and_then(|data| data.repository) {
            Some(repository) => Ok(repository.stargazers),
            None => bail!("GraphQL response has no repository data"),
        }
    }
}
