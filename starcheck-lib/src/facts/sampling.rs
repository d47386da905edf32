//! Choosing which pages of stargazers to fetch contribution data for.
//!
//! Contribution data is fetched a page of [`CONTRIBUTION_PAGE_SIZE`] stargazers at a
//! time, and a page is addressed by the cursor of the stargazer right before it. Small
//! populations are scanned entirely. Larger ones are scanned in two strata: the first
//! [`FIRST_STRATUM_USERS`] stargazers, who are the most likely to have been bought,
//! and a uniform random sample of the remaining pages sized by the star budget.

use super::contributions::CONTRIBUTION_PAGE_SIZE;
use super::stargazers::{StargazerCursor, StargazerIndex};
use crate::{HashSet, Result};
use ohno::bail;
use rand::Rng;

const LOG_TARGET: &str = "  sampling";

/// Size of the deterministic first stratum.
pub const FIRST_STRATUM_USERS: usize = 200;

/// Populations smaller than this are always scanned in full.
pub const SMALL_POPULATION_THRESHOLD: usize = FIRST_STRATUM_USERS + CONTRIBUTION_PAGE_SIZE;

/// Logins known to make the API time out. A page holding one of them is never fetched.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    logins: HashSet<String>,
}

impl Blacklist {
    #[must_use]
    pub fn contains(&self, login: &str) -> bool {
        self.logins.contains(login)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.logins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            logins: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A page of contribution data to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    /// The first page, which needs no cursor.
    First,

    /// The page right after the given stargazer.
    After(StargazerCursor),
}

impl PageRef {
    /// The cursor to resume the listing from, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        match self {
            Self::First => None,
            Self::After(c) => Some(&c.cursor),
        }
    }

    /// Position of the first stargazer on this page.
    #[must_use]
    pub const fn start(&self) -> usize {
        match self {
            Self::First => 0,
            Self::After(c) => c.position + 1,
        }
    }
}

/// The pages chosen for a scan.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Pages to fetch, in listing order.
    pub pages: Vec<PageRef>,

    /// Whether every page that is not blacklisted was selected.
    pub exhaustive: bool,

    /// Number of stargazers the repository has.
    pub population: usize,
}

fn page_is_blacklisted(index: &StargazerIndex, start: usize, blacklist: &Blacklist) -> bool {
    if blacklist.is_empty() {
        return false;
    }

    index
        .entries()
        .iter()
        .skip(start)
        .take(CONTRIBUTION_PAGE_SIZE)
        .any(|entry| {
            let listed = blacklist.contains(&entry.login);
            if listed {
                log::info!(target: LOG_TARGET, "Skipping the page holding blacklisted user {}", entry.login);
            }
            listed
        })
}

/// One reference per page after the first, in listing order.
///
/// Pages holding a blacklisted login are left out.
#[must_use]
pub fn boundary_cursors(index: &StargazerIndex, blacklist: &Blacklist) -> Vec<PageRef> {
    (CONTRIBUTION_PAGE_SIZE..index.len())
        .step_by(CONTRIBUTION_PAGE_SIZE)
        .filter(|&start| !page_is_blacklisted(index, start, blacklist))
        .filter_map(|start| index.get(start - 1).cloned().map(PageRef::After))
        .collect()
}

/// Choose the pages to fetch, given a budget of `stars` stargazers to sample.
pub fn select_pages(index: &StargazerIndex, stars: usize, scan_all: bool, blacklist: &Blacklist) -> Result<Selection> {
    select_pages_with(index, stars, scan_all, blacklist, &mut rand::rng())
}

fn select_pages_with<R: Rng + ?Sized>(
    index: &StargazerIndex,
    stars: usize,
    scan_all: bool,
    blacklist: &Blacklist,
    rng: &mut R,
) -> Result<Selection> {
    if stars < CONTRIBUTION_PAGE_SIZE {
        bail!("at least {CONTRIBUTION_PAGE_SIZE} stargazers must be sampled, got {stars}");
    }

    let budget = stars - stars % CONTRIBUTION_PAGE_SIZE;
    if budget != stars {
        log::warn!(target: LOG_TARGET, "Sampling {budget} stargazers instead of {stars}: the budget must be a multiple of {CONTRIBUTION_PAGE_SIZE}");
    }

    let population = index.len();
    let mut pages = Vec::new();
    if population > 0 && !page_is_blacklisted(index, 0, blacklist) {
        pages.push(PageRef::First);
    }

    let boundaries = boundary_cursors(index, blacklist);

    if population < SMALL_POPULATION_THRESHOLD {
        log::info!(target: LOG_TARGET, "All {population} stargazers will be scanned");
        pages.extend(boundaries);
        return Ok(Selection {
            pages,
            exhaustive: true,
            population,
        });
    }

    log::info!(target: LOG_TARGET, "Selecting the first {FIRST_STRATUM_USERS} stargazers out of {population}");
    let (first, remaining): (Vec<_>, Vec<_>) = boundaries.into_iter().partition(|page| page.start() < FIRST_STRATUM_USERS);
    pages.extend(first);

    if scan_all || population < budget {
        log::info!(target: LOG_TARGET, "Selecting all {} remaining stargazers", population - FIRST_STRATUM_USERS);
        pages.extend(remaining);
        return Ok(Selection {
            pages,
            exhaustive: true,
            population,
        });
    }

    let amount = (budget / CONTRIBUTION_PAGE_SIZE)
        .saturating_sub(FIRST_STRATUM_USERS / CONTRIBUTION_PAGE_SIZE)
        .min(remaining.len());
    log::info!(
        target: LOG_TARGET,
        "Selecting {} random stargazers out of {population}",
        amount * CONTRIBUTION_PAGE_SIZE
    );

    let mut picked = rand::seq::index::sample(rng, remaining.len(), amount).into_vec();
    picked.sort_unstable();
    pages.extend(picked.into_iter().filter_map(|i| remaining.get(i).cloned()));

    Ok(Selection {
        pages,
        exhaustive: amount == remaining.len(),
        population,
    })
}
