//! Turning collected stargazer data into trust scores.
//!
//! Every [`FactorKind`] averages one per-user metric and compares the average against
//! the value typically seen on popular, organically starred repositories. Large enough
//! groups are additionally scored at every fifth percentile of the weighted contribution
//! score, which exposes populations that mix genuine and fake accounts. The overall
//! trust is the weighted mean of all of these.

mod compute;
mod factor;
mod percentile;
mod report;

pub use compute::{MAX_TRUST, PERCENTILE_MIN_USERS, build_report, compute_trust, compute_trust_from_score};
pub use factor::{FACTOR_DEFINITIONS, FactorDef, FactorKind, OVERALL_NAME, PERCENTILE_REFERENCES};
pub use percentile::{percentile, sorted};
pub use report::{Report, Strata, TrustFactor, TrustReport};
