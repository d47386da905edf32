use super::hosting::{ContributionsCollection, Stargazer, Stargazers};
use crate::HashMap;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Lifetime contribution counters, summed over every year observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contributions {
    pub private: u64,
    pub issues: u64,
    pub commits: u64,
    pub repositories: u64,
    pub pull_requests: u64,
    pub reviews: u64,
}

impl Contributions {
    fn absorb(&mut self, year: &ContributionsCollection) {
        self.private += year.restricted_contributions_count;
        self.issues += year.total_issue_contributions;
        self.commits += year.total_commit_contributions;
        self.repositories += year.total_repository_contributions;
        self.pull_requests += year.total_pull_request_contributions;
        self.reviews += year.total_pull_request_review_contributions;
    }
}

/// Everything known about one stargazer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    pub login: String,
    pub created_at: Option<DateTime<Utc>>,
    pub contributions: Contributions,

    /// Contributions made during each calendar year, public and private.
    pub yearly: BTreeMap<i32, u64>,

    /// Position in the stargazer listing, oldest star first. `None` for a user who
    /// starred after the listing was taken.
    pub position: Option<usize>,
}

impl UserRecord {
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Self::default()
        }
    }

    /// Yearly contributions weighted by recency: a contribution made `n` years before
    /// `current_year` counts `(n + 1)^2` times.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "contribution counts stay far below 2^52")]
    pub fn contribution_score(&self, current_year: i32) -> f64 {
        self.yearly
            .iter()
            .map(|(&year, &count)| {
                let weight = f64::from(current_year - year + 1);
                count as f64 * weight * weight
            })
            .sum()
    }

    /// Days elapsed between account creation and `now`. Zero when the creation date is unknown.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "account ages in seconds stay far below 2^52")]
    pub fn account_age_days(&self, now: DateTime<Utc>) -> f64 {
        self.created_at
            .map_or(0.0, |created_at| (now - created_at).num_seconds() as f64 / SECONDS_PER_DAY)
    }
}

/// Per-user records, kept in the order users were first seen.
#[derive(Debug, Clone, Default)]
pub struct UserRecords {
    records: Vec<UserRecord>,
    by_login: HashMap<String, usize>,
}

impl UserRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, login: &str) -> Option<&UserRecord> {
        self.by_login.get(login).and_then(|&i| self.records.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[UserRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<UserRecord> {
        self.records
    }

    /// Add a record, replacing any earlier record for the same login in place.
    pub fn insert(&mut self, record: UserRecord) {
        if let Some(existing) = self.by_login.get(&record.login).and_then(|&i| self.records.get_mut(i)) {
            *existing = record;
            return;
        }

        let _ = self.by_login.insert(record.login.clone(), self.records.len());
        self.records.push(record);
    }

    /// Fold one stargazer's answer for `year` into their record.
    ///
    /// Lifetime counters are summed across years. The year's total overwrites any
    /// earlier value for that same year and leaves other years untouched.
    pub fn merge(&mut self, stargazer: &Stargazer, year: i32) {
        let collection = stargazer.contributions_collection.unwrap_or_default();
        let year_total = collection.contribution_calendar.total_contributions + collection.restricted_contributions_count;

        let index = match self.by_login.get(&stargazer.login) {
            Some(&i) => i,
            None => {
                let i = self.records.len();
                self.records.push(UserRecord::new(stargazer.login.as_str()));
                let _ = self.by_login.insert(stargazer.login.clone(), i);
                i
            }
        };

        if let Some(record) = self.records.get_mut(index) {
            if record.created_at.is_none() {
                record.created_at = stargazer.created_at;
            }
            record.contributions.absorb(&collection);
            let _ = record.yearly.insert(year, year_total);
        }
    }

    /// Fold every stargazer of a page answered for `year`.
    pub fn merge_page(&mut self, page: &Stargazers, year: i32) {
        for stargazer in &page.nodes {
            self.merge(stargazer, year);
        }
    }
}

impl FromIterator<UserRecord> for UserRecords {
    fn from_iter<T: IntoIterator<Item = UserRecord>>(iter: T) -> Self {
        let mut records = Self::new();
        for record in iter {
            records.insert(record);
        }
        records
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::facts::hosting::ContributionCalendar;

    fn answer(login: &str, calendar: u64, private: u64, commits: u64) -> Stargazer {
        Stargazer {
            login: login.to_string(),
            created_at: DateTime::from_timestamp(1_400_000_000, 0),
            contributions_collection: Some(ContributionsCollection {
                restricted_contributions_count: private,
                total_issue_contributions: 1,
                total_commit_contributions: commits,
                total_repository_contributions: 0,
                total_pull_request_contributions: 2,
                total_pull_request_review_contributions: 3,
                contribution_calendar: ContributionCalendar {
                    total_contributions: calendar,
                },
            }),
        }
    }

    #[test]
    fn new_login_is_seeded_from_answer() {
        let mut records = UserRecords::new();
        records.merge(&answer("alice", 100, 5, 40), 2020);

        let alice = records.get("alice").unwrap();
        assert_eq!(alice.yearly.get(&2020), Some(&105));
        assert_eq!(alice.contributions.private, 5);
        assert_eq!(alice.contributions.commits, 40);
        assert_eq!(alice.created_at, DateTime::from_timestamp(1_400_000_000, 0));
    }

    #[test]
    fn merging_two_years_sums_counters_and_touches_only_that_year() {
        let mut records = UserRecords::new();
        records.merge(&answer("alice", 100, 5, 40), 2020);
        records.merge(&answer("alice", 10, 1, 4), 2019);

        assert_eq!(records.len(), 1);
        let alice = records.get("alice").unwrap();
        assert_eq!(alice.contributions.private, 6);
        assert_eq!(alice.contributions.commits, 44);
        assert_eq!(alice.contributions.issues, 2);
        assert_eq!(alice.contributions.reviews, 6);
        assert_eq!(alice.yearly.get(&2020), Some(&105));
        assert_eq!(alice.yearly.get(&2019), Some(&11));
    }

    #[test]
    fn same_year_overwrites() {
        let mut records = UserRecords::new();
        records.merge(&answer("alice", 100, 0, 0), 2020);
        records.merge(&answer("alice", 7, 0, 0), 2020);
        assert_eq!(records.get("alice").unwrap().yearly.get(&2020), Some(&7));
    }

    #[test]
    fn first_seen_order_is_kept() {
        let mut records = UserRecords::new();
        for login in ["carol", "alice", "bob"] {
            records.merge(&answer(login, 1, 0, 0), 2021);
        }
        records.merge(&answer("alice", 1, 0, 0), 2020);

        let logins: Vec<_> = records.iter().map(|r| r.login.as_str()).collect();
        assert_eq!(logins, ["carol", "alice", "bob"]);
    }

    #[test]
    fn missing_collection_counts_as_zero() {
        let mut records = UserRecords::new();
        let stargazer = Stargazer {
            login: "ghost".to_string(),
            created_at: None,
            contributions_collection: None,
        };
        records.merge(&stargazer, 2022);

        let ghost = records.get("ghost").unwrap();
        assert_eq!(ghost.yearly.get(&2022), Some(&0));
        assert_eq!(ghost.contributions, Contributions::default());
    }

    #[test]
    fn contribution_score_weights_by_recency() {
        let mut record = UserRecord::new("alice");
        let _ = record.yearly.insert(2024, 600);
        let _ = record.yearly.insert(2023, 400);
        assert!((record.contribution_score(2024) - 2200.0).abs() < f64::EPSILON);

        let _ = record.yearly.insert(2014, 1);
        assert!((record.contribution_score(2024) - 2321.0).abs() < f64::EPSILON);
    }

    #[test]
    fn account_age() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut record = UserRecord::new("alice");
        assert!(record.account_age_days(now).abs() < f64::EPSILON);

        record.created_at = Some(now - chrono::Duration::days(730));
        assert!((record.account_age_days(now) - 730.0).abs() < 1e-9);
    }
}
