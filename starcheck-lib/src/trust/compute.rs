use super::factor::{FactorKind, PERCENTILE_REFERENCES};
use super::percentile::{percentile, sorted};
use super::report::{Report, Strata, TrustFactor, TrustReport};
use crate::Result;
use crate::facts::{FIRST_STRATUM_USERS, Sample, UserRecord};
use chrono::{DateTime, Datelike, Utc};
use ohno::{app_err, bail};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "     trust";

/// Highest trust any single value can earn.
pub const MAX_TRUST: f64 = 0.99;

/// Percentiles are scored only for groups larger than this.
pub const PERCENTILE_MIN_USERS: usize = 20;

/// Trust earned by `score` against the `reference` value seen on organically starred
/// repositories. Reaches [`MAX_TRUST`] at one and a half times the reference.
#[must_use]
pub fn compute_trust_from_score(score: f64, reference: f64) -> f64 {
    let trust = score / (1.5 * reference);
    if trust.is_nan() || trust <= 0.0 {
        0.0
    } else {
        trust.min(MAX_TRUST)
    }
}

/// Score the stargazers of `sample` as of `now`.
///
/// When every stargazer of a repository with more than [`FIRST_STRATUM_USERS`]
/// stargazers was scanned, the users listed at the first [`FIRST_STRATUM_USERS`]
/// positions and the remaining ones are scored separately, and the final report
/// keeps the worst of both.
pub fn compute_trust(sample: &Sample, now: DateTime<Utc>) -> Result<TrustReport> {
    if sample.users.is_empty() {
        bail!("no stargazer data was collected for {}, cannot compute trust", sample.repo);
    }

    if sample.exhaustive && sample.users.len() > FIRST_STRATUM_USERS {
        let (first_users, remaining_users): (Vec<_>, Vec<_>) = sample
            .users
            .iter()
            .cloned()
            .partition(|user| user.position.is_some_and(|p| p < FIRST_STRATUM_USERS));

        if first_users.is_empty() || remaining_users.is_empty() {
            log::info!(target: LOG_TARGET, "One stratum is empty, scoring all stargazers together");
            return Ok(TrustReport {
                report: build_report(&sample.users, now)?,
                strata: None,
            });
        }

        let first = build_report(&first_users, now)?;
        let remaining = build_report(&remaining_users, now)?;

        log::info!(
            target: LOG_TARGET,
            "Comparing the first {} stargazers with the {} others",
            first_users.len(),
            remaining_users.len()
        );

        return Ok(TrustReport {
            report: Report::pessimistic(&first, &remaining),
            strata: Some(Strata {
                first,
                remaining,
                first_users: first_users.len(),
                remaining_users: remaining_users.len(),
            }),
        });
    }

    Ok(TrustReport {
        report: build_report(&sample.users, now)?,
        strata: None,
    })
}

/// Score one group of users.
#[expect(clippy::cast_precision_loss, reason = "sample sizes stay far below 2^52")]
pub fn build_report(users: &[UserRecord], now: DateTime<Utc>) -> Result<Report> {
    if users.is_empty() {
        bail!("cannot score an empty group of stargazers");
    }

    let count = users.len() as f64;
    let factors: BTreeMap<FactorKind, TrustFactor> = FactorKind::iter()
        .map(|kind| {
            let mean = users.iter().map(|user| kind.extract(user, now)).sum::<f64>() / count;
            let factor = TrustFactor {
                value: mean,
                trust: compute_trust_from_score(mean, kind.reference()),
            };
            (kind, factor)
        })
        .collect();

    let percentiles = if users.len() > PERCENTILE_MIN_USERS {
        let scores = sorted(users.iter().map(|user| user.contribution_score(now.year())));
        let mut percentiles = BTreeMap::new();

        for &(p, reference) in PERCENTILE_REFERENCES {
            let value = percentile(&scores, f64::from(p))
                .ok_or_else(|| app_err!("unable to compute the {p}th percentile of {} scores", scores.len()))?;

            let _ = percentiles.insert(
                p,
                TrustFactor {
                    value,
                    trust: compute_trust_from_score(value, reference),
                },
            );
        }

        Some(percentiles)
    } else {
        None
    };

    Ok(Report::new(factors, percentiles))
}
