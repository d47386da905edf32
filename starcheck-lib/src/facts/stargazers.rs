use super::cache::PageSuffix;
use super::hosting::listing_query;
use super::page_loader::PageLoader;
use super::progress::Progress;
use crate::Result;
use core::sync::atomic::{AtomicUsize, Ordering};
use ohno::bail;
use std::sync::Arc;

const LOG_TARGET: &str = "stargazers";

/// Stargazers requested per listing page.
pub const LIST_PAGE_SIZE: usize = 100;

/// A stargazer's place in the full listing, along with the cursor that points right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StargazerCursor {
    pub position: usize,
    pub login: String,
    pub cursor: String,
}

/// Every stargazer of a repository, in listing order.
#[derive(Debug, Clone, Default)]
pub struct StargazerIndex {
    entries: Vec<StargazerCursor>,
}

impl StargazerIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next stargazer of the listing.
    pub fn push(&mut self, login: impl Into<String>, cursor: impl Into<String>) {
        self.entries.push(StargazerCursor {
            position: self.entries.len(),
            login: login.into(),
            cursor: cursor.into(),
        });
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&StargazerCursor> {
        self.entries.get(position)
    }

    #[must_use]
    pub fn entries(&self) -> &[StargazerCursor] {
        &self.entries
    }
}

impl<L: Into<String>, C: Into<String>> FromIterator<(L, C)> for StargazerIndex {
    fn from_iter<T: IntoIterator<Item = (L, C)>>(iter: T) -> Self {
        let mut index = Self::new();
        for (login, cursor) in iter {
            index.push(login, cursor);
        }
        index
    }
}

/// Page through the complete stargazer list of the loader's repository.
///
/// Listing stops at the first page that is shorter than [`LIST_PAGE_SIZE`], or that
/// the server marks as the last one.
pub async fn list_stargazers(loader: &mut PageLoader, progress: &dyn Progress) -> Result<StargazerIndex> {
    let listed = Arc::new(AtomicUsize::new(0));
    let listed_clone = Arc::clone(&listed);
    progress.set_phase("Listing");
    progress.set_indeterminate(Box::new(move || format!("{} stargazers listed", listed_clone.load(Ordering::Relaxed))));

    let mut index = StargazerIndex::new();
    let mut last_cursor: Option<String> = None;

    loop {
        let query = listing_query(loader.repo(), LIST_PAGE_SIZE, last_cursor.as_deref());
        let page = loader.load(PageSuffix::Listing(last_cursor.as_deref()), &query).await?;

        if page.edges.len() != page.nodes.len() {
            bail!(
                "listing page of {} returned {} cursors for {} stargazers",
                loader.repo(),
                page.edges.len(),
                page.nodes.len()
            );
        }

        for (node, edge) in page.nodes.iter().zip(&page.edges) {
            index.push(node.login.as_str(), edge.cursor.as_str());
        }
        listed.store(index.len(), Ordering::Relaxed);

        log::debug!(target: LOG_TARGET, "Listed {} stargazers of {} so far", index.len(), loader.repo());

        if page.nodes.len() < LIST_PAGE_SIZE || page.has_next_page() == Some(false) {
            break;
        }

        last_cursor = page.last_cursor().map(str::to_string);
    }

    log::info!(target: LOG_TARGET, "{} has {} stargazers", loader.repo(), index.len());
    Ok(index)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::facts::progress::NoProgress;
    use crate::facts::test_pages::{cursor, listing_page, login, offline_loader, seed};

    #[test]
    fn index_positions_follow_insertion_order() {
        let index: StargazerIndex = [("alice", "c0"), ("bob", "c1"), ("carol", "c2")].into_iter().collect();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(1).unwrap().login, "bob");
        assert_eq!(index.get(2).unwrap().position, 2);
        assert!(index.get(3).is_none());
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn short_page_ends_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        let c99 = cursor(99);
        seed(&loader, PageSuffix::Listing(None), &listing_page(0..100, Some(true)));
        seed(&loader, PageSuffix::Listing(Some(&c99)), &listing_page(100..142, None));

        // No page after the short one is cached, so requesting it would fail
        let index = list_stargazers(&mut loader, &NoProgress).await.unwrap();
        assert_eq!(index.len(), 142);
        assert_eq!(index.get(141).unwrap().login, login(141));
        assert_eq!(index.get(100).unwrap().cursor, cursor(100));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn exact_multiple_ends_on_has_next_page() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        let c99 = cursor(99);
        seed(&loader, PageSuffix::Listing(None), &listing_page(0..100, Some(true)));
        seed(&loader, PageSuffix::Listing(Some(&c99)), &listing_page(100..200, Some(false)));

        let index = list_stargazers(&mut loader, &NoProgress).await.unwrap();
        assert_eq!(index.len(), 200);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn exact_multiple_without_page_info_ends_on_empty_page() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        let c99 = cursor(99);
        seed(&loader, PageSuffix::Listing(None), &listing_page(0..100, None));
        seed(&loader, PageSuffix::Listing(Some(&c99)), &listing_page(100..100, None));

        let index = list_stargazers(&mut loader, &NoProgress).await.unwrap();
        assert_eq!(index.len(), 100);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn repository_without_stargazers() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        seed(&loader, PageSuffix::Listing(None), &listing_page(0..0, Some(false)));

        let index = list_stargazers(&mut loader, &NoProgress).await.unwrap();
        assert!(index.is_empty());
    }
}
