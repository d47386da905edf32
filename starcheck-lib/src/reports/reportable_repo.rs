use crate::facts::{RepoSpec, Sample};
use crate::trust::TrustReport;

/// A repository with its trust scores, ready for reporting.
#[derive(Debug, Clone)]
pub struct ReportableRepo {
    pub repo: RepoSpec,

    /// Stargazers the repository has.
    pub population: usize,

    /// Stargazers whose contributions were scanned.
    pub scanned: usize,

    /// Whether every stargazer was scanned.
    pub exhaustive: bool,

    pub trust: TrustReport,
}

impl ReportableRepo {
    #[must_use]
    pub fn new(sample: &Sample, trust: TrustReport) -> Self {
        Self {
            repo: sample.repo.clone(),
            population: sample.population,
            scanned: sample.users.len(),
            exhaustive: sample.exhaustive,
            trust,
        }
    }
}
