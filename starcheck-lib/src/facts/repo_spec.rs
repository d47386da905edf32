use crate::Result;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::{IntoAppError, bail};
use std::sync::Arc;
use url::Url;

/// Identifies the GitHub repository whose stargazers are scanned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    /// Build a spec from an owner and a repository name.
    pub fn new(owner: &str, repo: &str) -> Result<Self> {
        let repo = repo.trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository '{owner}/{repo}': empty owner or repository name");
        }

        if [owner, repo].iter().any(|part| part.contains(['/', '\\', '"', ' ']) || *part == "..") {
            bail!("invalid repository '{owner}/{repo}': unexpected character in owner or repository name");
        }

        Ok(Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
        })
    }

    /// Parse a repository URL such as `https://github.com/owner/repo/tree/main`.
    pub fn parse_url(url: &Url) -> Result<Self> {
        if url.host_str() != Some("github.com") {
            bail!("unsupported repository host in '{url}': only github.com is supported");
        }

        let path_segments: Vec<_> = url.path_segments().map(Iterator::collect).unwrap_or_default();
        if path_segments.len() < 2 {
            bail!("invalid repository URL format: {url}");
        }

        Self::new(path_segments[0], path_segments[1])
    }

    /// Accepts `owner/repo` or a `https://github.com/owner/repo` URL.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.contains("://") {
            let url = Url::parse(s).into_app_err_with(|| format!("parsing repository URL '{s}'"))?;
            return Self::parse_url(&url);
        }

        let Some((owner, repo)) = s.split_once('/') else {
            bail!("invalid repository '{s}': should be of the form 'owner/repo'");
        };

        Self::new(owner, repo)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Self::parse(s).map_err(|e| e.to_string())
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
