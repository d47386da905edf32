use super::cache::PageSuffix;
use super::hosting::contribution_query;
use super::page_loader::PageLoader;
use super::progress::Progress;
use super::sampling::PageRef;
use super::user_record::UserRecords;
use crate::Result;
use core::sync::atomic::{AtomicU64, Ordering};
use ohno::bail;
use std::sync::Arc;

const LOG_TARGET: &str = "   contrib";

/// Stargazers requested per contribution page. Larger pages tend to time out server-side.
pub const CONTRIBUTION_PAGE_SIZE: usize = 20;

/// The calendar years to collect contributions for, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    newest: i32,
    oldest: i32,
}

impl YearRange {
    /// Oldest year scanned unless configured otherwise.
    pub const DEFAULT_OLDEST: i32 = 2013;

    pub fn new(newest: i32, oldest: i32) -> Result<Self> {
        if oldest > newest {
            bail!("cannot scan contributions back to {oldest}, which is after {newest}");
        }

        Ok(Self { newest, oldest })
    }

    #[must_use]
    pub const fn newest(&self) -> i32 {
        self.newest
    }

    #[must_use]
    pub const fn oldest(&self) -> i32 {
        self.oldest
    }

    #[must_use]
    #[expect(clippy::cast_sign_loss, reason = "oldest never exceeds newest")]
    pub const fn len(&self) -> usize {
        (self.newest - self.oldest + 1) as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Years from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = i32> {
        (self.oldest..=self.newest).rev()
    }
}

/// Fetch every selected page for every year in `years`, and aggregate per user.
pub async fn fetch_contributions(
    loader: &mut PageLoader,
    pages: &[PageRef],
    years: YearRange,
    progress: &dyn Progress,
) -> Result<UserRecords> {
    let total = (pages.len() * years.len()) as u64;
    let fetched = Arc::new(AtomicU64::new(0));
    let users = Arc::new(AtomicU64::new(0));

    let fetched_clone = Arc::clone(&fetched);
    let users_clone = Arc::clone(&users);
    progress.set_phase("Fetching");
    progress.set_determinate(Box::new(move || {
        (
            total,
            fetched_clone.load(Ordering::Relaxed),
            format!("contributions of {} stargazers", users_clone.load(Ordering::Relaxed)),
        )
    }));

    let mut records = UserRecords::new();

    for page in pages {
        for year in years.iter() {
            let query = contribution_query(loader.repo(), CONTRIBUTION_PAGE_SIZE, page.cursor(), year);
            let answer = loader.load(PageSuffix::Contributions(page.cursor(), year), &query).await?;

            if answer.nodes.is_empty() {
                log::debug!(target: LOG_TARGET, "No stargazers on the page starting at #{} for {year}", page.start());
            }

            records.merge_page(&answer, year);
            let _ = fetched.fetch_add(1, Ordering::Relaxed);
            users.store(records.len() as u64, Ordering::Relaxed);
        }
    }

    log::info!(
        target: LOG_TARGET,
        "Collected contributions of {} stargazers from {} to {}",
        records.len(),
        years.oldest(),
        years.newest()
    );

    Ok(records)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::facts::progress::NoProgress;
    use crate::facts::stargazers::StargazerCursor;
    use crate::facts::test_pages::{contribution_page, cursor, login, offline_loader, seed};

    #[test]
    fn year_range_iterates_newest_first() {
        let years = YearRange::new(2024, 2021).unwrap();
        assert_eq!(years.iter().collect::<Vec<_>>(), [2024, 2023, 2022, 2021]);
        assert_eq!(years.len(), 4);
    }

    #[test]
    fn single_year_range() {
        let years = YearRange::new(2013, 2013).unwrap();
        assert_eq!(years.len(), 1);
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let _ = YearRange::new(2013, 2020).unwrap_err();
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn pages_and_years_are_merged() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        let c19 = cursor(19);

        seed(&loader, PageSuffix::Contributions(None, 2024), &contribution_page(0..20, 600));
        seed(&loader, PageSuffix::Contributions(None, 2023), &contribution_page(0..20, 400));
        seed(&loader, PageSuffix::Contributions(Some(&c19), 2024), &contribution_page(20..25, 10));
        seed(&loader, PageSuffix::Contributions(Some(&c19), 2023), &contribution_page(20..25, 0));

        let pages = [
            PageRef::First,
            PageRef::After(StargazerCursor {
                position: 19,
                login: login(19),
                cursor: c19,
            }),
        ];

        let years = YearRange::new(2024, 2023).unwrap();
        let records = fetch_contributions(&mut loader, &pages, years, &NoProgress).await.unwrap();

        assert_eq!(records.len(), 25);
        assert_eq!(records.as_slice()[0].login, login(0));
        assert_eq!(records.as_slice()[24].login, login(24));

        // Each year page reports one private contribution on top of the calendar
        let first = records.get(&login(0)).unwrap();
        assert_eq!(first.yearly.get(&2024), Some(&601));
        assert_eq!(first.yearly.get(&2023), Some(&401));
        assert_eq!(first.contributions.commits, 2);

        let late = records.get(&login(22)).unwrap();
        assert_eq!(late.yearly.get(&2024), Some(&11));
        assert_eq!(late.yearly.get(&2023), Some(&1));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn missing_page_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = offline_loader(tmp.path());
        seed(&loader, PageSuffix::Contributions(None, 2024), &contribution_page(0..20, 1));

        let years = YearRange::new(2024, 2023).unwrap();
        let _ = fetch_contributions(&mut loader, &[PageRef::First], years, &NoProgress)
            .await
            .unwrap_err();
    }
}
