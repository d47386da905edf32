use super::factor::FactorKind;
use std::collections::BTreeMap;

/// A scored value: the raw average and the fraction of trust it earns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrustFactor {
    pub value: f64,

    /// Between 0 and 0.99.
    pub trust: f64,
}

/// The trust scores of one group of stargazers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// One entry per factor, iterated in declaration order.
    pub factors: BTreeMap<FactorKind, TrustFactor>,

    /// Trust per percentile of the weighted contribution score, when the group is large
    /// enough for percentiles to be meaningful.
    pub percentiles: Option<BTreeMap<u8, TrustFactor>>,

    /// Weighted mean of every factor and percentile trust. Its value is the trust itself.
    pub overall: TrustFactor,
}

impl Report {
    /// Assemble a report and derive its overall score.
    #[must_use]
    pub fn new(factors: BTreeMap<FactorKind, TrustFactor>, percentiles: Option<BTreeMap<u8, TrustFactor>>) -> Self {
        let mut sum = 0.0;
        let mut count = 0_u32;

        for (kind, factor) in &factors {
            sum += f64::from(kind.weight()) * factor.trust;
            count += kind.weight();
        }

        for factor in percentiles.iter().flat_map(BTreeMap::values) {
            sum += factor.trust;
            count += 1;
        }

        let trust = if count == 0 { 0.0 } else { sum / f64::from(count) };

        Self {
            factors,
            percentiles,
            overall: TrustFactor { value: trust, trust },
        }
    }

    /// Combine two reports by keeping, for each factor and each percentile, whichever
    /// one earns less trust.
    ///
    /// Percentiles are kept only if both reports have them. The overall score is
    /// derived again from the combined values.
    #[must_use]
    pub fn pessimistic(first: &Self, second: &Self) -> Self {
        let lower = |a: &TrustFactor, b: &TrustFactor| if a.trust <= b.trust { *a } else { *b };

        let factors = first
            .factors
            .iter()
            .map(|(kind, a)| (*kind, second.factors.get(kind).map_or(*a, |b| lower(a, b))))
            .collect();

        let percentiles = match (&first.percentiles, &second.percentiles) {
            (Some(a), Some(b)) => Some(
                a.iter()
                    .filter_map(|(p, fa)| b.get(p).map(|fb| (*p, lower(fa, fb))))
                    .collect(),
            ),
            _ => None,
        };

        Self::new(factors, percentiles)
    }

    #[must_use]
    pub fn factor(&self, kind: FactorKind) -> Option<&TrustFactor> {
        self.factors.get(&kind)
    }
}

/// The outcome of a trust computation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustReport {
    /// The report to act upon.
    pub report: Report,

    /// The reports of the first stargazers and of the remaining ones, when the final
    /// report was derived from both.
    pub strata: Option<Strata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strata {
    pub first: Report,
    pub remaining: Report,
    pub first_users: usize,
    pub remaining_users: usize,
}
