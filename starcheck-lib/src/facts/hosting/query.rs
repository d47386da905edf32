//! GraphQL query bodies.
//!
//! Both queries share the same shape: a `rateLimit` block so that every response
//! reports the remaining quota, and a page of the repository's stargazers with
//! their cursors. The contribution query additionally asks for each stargazer's
//! account age and a one-year slice of their contribution counters.

use crate::facts::RepoSpec;

/// Render a GraphQL string literal. GraphQL string escapes are a subset of JSON's.
fn literal(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn after_clause(after: Option<&str>) -> String {
    after.map_or_else(String::new, |cursor| format!(", after: {}", literal(cursor)))
}

/// Wrap a query in the JSON request envelope.
fn envelope(query: &str) -> String {
    serde_json::json!({ "query": query }).to_string()
}

/// Request body listing one page of stargazer logins and cursors. Cheap in quota terms.
#[must_use]
pub fn listing_query(repo: &RepoSpec, page_size: usize, after: Option<&str>) -> String {
    let query = format!(
        concat!(
            "query {{ ",
            "rateLimit {{ limit remaining resetAt }} ",
            "repository(owner: {owner}, name: {name}) {{ ",
            "stargazers(first: {first}{after}) {{ ",
            "pageInfo {{ hasNextPage }} ",
            "edges {{ cursor }} ",
            "nodes {{ login }} ",
            "}} }} }}",
        ),
        owner = literal(repo.owner()),
        name = literal(repo.repo()),
        first = page_size,
        after = after_clause(after),
    );

    envelope(&query)
}

/// Request body fetching one page of stargazers with their contributions during `year`.
///
/// Expensive in quota terms, and prone to server-side timeouts when the page is large.
#[must_use]
pub fn contribution_query(repo: &RepoSpec, page_size: usize, after: Option<&str>, year: i32) -> String {
    let query = format!(
        concat!(
            "query {{ ",
            "rateLimit {{ limit remaining resetAt }} ",
            "repository(owner: {owner}, name: {name}) {{ ",
            "stargazers(first: {first}{after}) {{ ",
            "pageInfo {{ hasNextPage }} ",
            "edges {{ cursor }} ",
            "nodes {{ ",
            "login createdAt ",
            "contributionsCollection(from: {from}, to: {to}) {{ ",
            "restrictedContributionsCount ",
            "totalIssueContributions ",
            "totalCommitContributions ",
            "totalRepositoryContributions ",
            "totalPullRequestContributions ",
            "totalPullRequestReviewContributions ",
            "contributionCalendar {{ totalContributions }} ",
            "}} }} }} }} }}",
        ),
        owner = literal(repo.owner()),
        name = literal(repo.repo()),
        first = page_size,
        after = after_clause(after),
        from = literal(&format!("{year:04}-01-01T00:00:00Z")),
        to = literal(&format!("{year:04}-12-31T23:59:59Z")),
    );

    envelope(&query)
}
