use crate::config::{AllNulls, ImputePolicy, SomeNulls};
use crate::means::GlobalMeans;

/// Fill every missing entry of one column according to the configured
/// policy. Pure and per-column: no cross-column state, row order preserved,
/// output always fully numeric.
///
/// Fully observed columns pass through unchanged. Partially observed
/// columns are closed by the `some_nulls` strategy; interpolation runs by
/// row index, and any leading or trailing gap it cannot reach takes the
/// nearest known value. Fully unobserved columns take the global mean when
/// one is known for the column, otherwise zero.
pub fn impute(
    column: &[Option<f64>],
    name: &str,
    policy: ImputePolicy,
    means: &GlobalMeans,
) -> Vec<f64> {
    let observed = column.iter().filter(|v| v.is_some()).count();
    if observed == column.len() {
        return column.iter().flatten().copied().collect();
    }
    if observed == 0 {
        let fill = match policy.all_nulls {
            AllNulls::GlobalMean => means.get(name).unwrap_or(0.0),
            AllNulls::Zero => 0.0,
        };
        return vec![fill; column.len()];
    }
    fill_partial(column, policy.some_nulls == SomeNulls::LinearInterpolate)
}

/// Close the gaps of a partially observed column. Interior gaps are either
/// linearly interpolated by row index or carried forward from the preceding
/// observation; gaps before the first or after the last observation take
/// the nearest known value.
fn fill_partial(column: &[Option<f64>], interpolate: bool) -> Vec<f64> {
    let known: Vec<(usize, f64)> = column
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.map(|value| (idx, value)))
        .collect();
    if known.is_empty() {
        return vec![0.0; column.len()];
    }

    let mut filled = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        // First known observation at or after this row.
        let next = known.partition_point(|&(k, _)| k < idx);
        let prev = next.checked_sub(1).map(|p| known[p]);
        let value = match (prev, known.get(next)) {
            (_, Some(&(k, v))) if k == idx => v,
            (Some((pk, pv)), Some(&(nk, nv))) if interpolate => {
                pv + (nv - pv) * (idx - pk) as f64 / (nk - pk) as f64
            }
            (Some((_, pv)), _) => pv,
            (None, Some(&(_, nv))) => nv,
            (None, None) => 0.0,
        };
        filled.push(value);
    }
    filled
}
