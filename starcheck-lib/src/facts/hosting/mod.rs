//! Access to GitHub's GraphQL API.

mod client;
mod query;
mod response;

pub use client::{Client, GITHUB_GRAPHQL_ENDPOINT, HostingApiResult, RateLimitInfo};
pub use query::{contribution_query, listing_query};
pub use response::{
    ContributionCalendar, ContributionsCollection, Edge, GraphQlError, GraphQlResponse, PageInfo, RateLimit, Repository, ResponseData,
    Stargazer, Stargazers,
};
