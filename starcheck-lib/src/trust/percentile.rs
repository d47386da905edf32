/// The `p`th percentile of `sorted`, which must be in ascending order.
///
/// Uses the nearest rank with midpoint averaging: the rank is `p / 100 * n`. An
/// integral rank selects that element. A fractional rank above one averages the
/// elements on either side of it. Returns `None` for an empty slice, and for
/// fractional ranks below one, where no lower neighbor exists.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "sample sizes stay far below 2^52")]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rank is positive and bounded by the slice length"
)]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    match sorted {
        [] => None,
        [single] => Some(*single),
        _ => {
            let rank = p / 100.0 * sorted.len() as f64;

            if rank.fract() == 0.0 {
                return (rank as usize).checked_sub(1).and_then(|i| sorted.get(i)).copied();
            }

            if rank > 1.0 {
                let i = rank.floor() as usize;
                return Some((sorted.get(i - 1)? + sorted.get(i)?) / 2.0);
            }

            None
        }
    }
}

/// Sort values ascending, as [`percentile`] expects.
#[must_use]
pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values
}
