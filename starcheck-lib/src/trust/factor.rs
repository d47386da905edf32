use crate::facts::UserRecord;
use chrono::{DateTime, Datelike, Utc};
use strum::{Display, EnumIter, IntoStaticStr};

/// The dimensions along which stargazers are scored, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display, IntoStaticStr)]
pub enum FactorKind {
    #[strum(serialize = "Weighted contributions")]
    ContributionScore,

    #[strum(serialize = "Private contributions")]
    PrivateContributions,

    #[strum(serialize = "Created issues")]
    Issues,

    #[strum(serialize = "Commits authored")]
    Commits,

    #[strum(serialize = "Repositories")]
    Repositories,

    #[strum(serialize = "Pull requests")]
    PullRequests,

    #[strum(serialize = "Code reviews")]
    CodeReviews,

    #[strum(serialize = "Account age (days)")]
    AccountAge,
}

/// Display name of the combined score.
pub const OVERALL_NAME: &str = "Overall trust";

#[derive(Debug)]
pub struct FactorDef {
    pub kind: FactorKind,

    /// Average value seen on popular, organically starred repositories.
    pub reference: f64,

    /// How many times the factor counts toward the overall score.
    pub weight: u32,

    pub extractor: fn(&UserRecord, DateTime<Utc>) -> f64,
}

macro_rules! factor_def {
    ($kind:ident, $reference:expr, $weight:expr, $extractor:expr) => {
        FactorDef {
            kind: FactorKind::$kind,
            reference: $reference,
            weight: $weight,
            extractor: $extractor,
        }
    };
}

#[expect(clippy::cast_precision_loss, reason = "contribution counts stay far below 2^52")]
const fn count(value: u64) -> f64 {
    value as f64
}

/// One entry per [`FactorKind`], in declaration order.
pub const FACTOR_DEFINITIONS: &[FactorDef] = &[
    factor_def!(ContributionScore, 18000.0, 8, |user, now| user.contribution_score(now.year())),
    factor_def!(PrivateContributions, 300.0, 1, |user, _| count(user.contributions.private)),
    factor_def!(Issues, 18.0, 3, |user, _| count(user.contributions.issues)),
    factor_def!(Commits, 370.0, 3, |user, _| count(user.contributions.commits)),
    factor_def!(Repositories, 25.0, 2, |user, _| count(user.contributions.repositories)),
    factor_def!(PullRequests, 20.0, 2, |user, _| count(user.contributions.pull_requests)),
    factor_def!(CodeReviews, 7.0, 2, |user, _| count(user.contributions.reviews)),
    factor_def!(AccountAge, 1600.0, 2, UserRecord::account_age_days),
];

/// Percentiles of the weighted contribution score that are scored, with the value
/// each one reaches on popular, organically starred repositories.
pub const PERCENTILE_REFERENCES: &[(u8, f64)] = &[
    (5, 6.0),
    (10, 18.0),
    (15, 34.0),
    (20, 76.0),
    (25, 142.0),
    (30, 232.0),
    (35, 396.0),
    (40, 435.0),
    (45, 625.0),
    (50, 1005.0),
    (55, 1490.0),
    (60, 2230.0),
    (65, 3680.0),
    (70, 5100.0),
    (75, 7850.0),
    (80, 9230.0),
    (85, 17800.0),
    (90, 28495.0),
    (95, 51230.0),
];

impl FactorKind {
    #[must_use]
    pub fn definition(self) -> &'static FactorDef {
        FACTOR_DEFINITIONS
            .iter()
            .find(|def| def.kind == self)
            .unwrap_or_else(|| unreachable!("every factor kind has a definition"))
    }

    #[must_use]
    pub fn reference(self) -> f64 {
        self.definition().reference
    }

    #[must_use]
    pub fn weight(self) -> u32 {
        self.definition().weight
    }

    /// This factor's raw value for one user.
    #[must_use]
    pub fn extract(self, user: &UserRecord, now: DateTime<Utc>) -> f64 {
        (self.definition().extractor)(user, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn definitions_follow_declaration_order() {
        let kinds: Vec<_> = FACTOR_DEFINITIONS.iter().map(|def| def.kind).collect();
        let declared: Vec<_> = FactorKind::iter().collect();
        assert_eq!(kinds, declared);
    }

    #[test]
    fn weights_sum() {
        let total: u32 = FactorKind::iter().map(FactorKind::weight).sum();
        assert_eq!(total, 23);
    }

    #[test]
    fn display_names() {
        assert_eq!(FactorKind::ContributionScore.to_string(), "Weighted contributions");
        assert_eq!(FactorKind::AccountAge.to_string(), "Account age (days)");
        let name: &'static str = FactorKind::CodeReviews.into();
        assert_eq!(name, "Code reviews");
    }

    #[test]
    fn percentiles_are_every_fifth() {
        let percentiles: Vec<u8> = PERCENTILE_REFERENCES.iter().map(|&(p, _)| p).collect();
        let expected: Vec<u8> = (5..=95).step_by(5).collect();
        assert_eq!(percentiles, expected);
    }

    #[test]
    fn extract_counts() {
        let mut user = UserRecord::new("alice");
        user.contributions.commits = 12;
        user.contributions.reviews = 3;
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert!((FactorKind::Commits.extract(&user, now) - 12.0).abs() < f64::EPSILON);
        assert!((FactorKind::CodeReviews.extract(&user, now) - 3.0).abs() < f64::EPSILON);
        assert!(FactorKind::Issues.extract(&user, now).abs() < f64::EPSILON);
    }
}
