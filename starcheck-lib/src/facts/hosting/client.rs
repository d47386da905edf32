//! GitHub GraphQL client
//!
//! Minimal client that posts query bodies and classifies the HTTP outcome. The body
//! itself is interpreted by the caller.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::app_err;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// The public GitHub GraphQL endpoint.
pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

const USER_AGENT: &str = "starcheck";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest error body excerpt carried into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: Option<u32>,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Result of a hosting API call
#[derive(Debug)]
pub enum HostingApiResult {
    /// Request succeeded - contains the raw body and optional rate limit info
    Success(Bytes, Option<RateLimitInfo>),

    /// Rate limited - should retry after reset time
    RateLimited(DateTime<Utc>),

    /// The request never produced a usable response - worth retrying
    Transient(ohno::AppError),

    /// Request failed permanently - should NOT retry
    Failed(ohno::AppError),
}

/// GraphQL API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    endpoint: String,
}

impl Client {
    /// Create a new client authenticating with `token` against `endpoint`
    pub fn new(token: &str, endpoint: impl Into<String>) -> crate::Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("bearer {token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The URL queries are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post a query body and classify the result
    pub async fn post(&self, body: &str) -> HostingApiResult {
        let resp = match self.client.post(&self.endpoint).body(body.to_owned()).send().await {
            Ok(r) => r,
            Err(e) if e.is_builder() => return HostingApiResult::Failed(e.into()),
            Err(e) => return HostingApiResult::Transient(e.into()),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        let status = resp.status();

        if status.is_success() {
            return match resp.bytes().await {
                Ok(body) => HostingApiResult::Success(body, rate_limit),
                Err(e) => HostingApiResult::Transient(e.into()),
            };
        }

        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
            if let Some(info) = rate_limit.filter(|info| info.remaining == 0) {
                return HostingApiResult::RateLimited(info.reset_at);
            }

            // Secondary rate limits announce themselves through retry-after instead
            if let Some(secs) = retry_after_secs(resp.headers()) {
                return HostingApiResult::RateLimited(Utc::now() + chrono::Duration::seconds(secs));
            }
        }

        let mut text = resp.text().await.unwrap_or_default();
        if text.len() > MAX_ERROR_BODY {
            let mut end = MAX_ERROR_BODY;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }

        HostingApiResult::Failed(app_err!("HTTP {status} from {}: {}", self.endpoint, text.trim()))
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<u32>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    let limit = headers
        .get("x-ratelimit-limit")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok());

    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
    })
}

fn retry_after_secs(headers: &HeaderMap) -> Option<i64> {
    headers.get("retry-after")?.to_str().ok()?.trim().parse::<i64>().ok()
}
