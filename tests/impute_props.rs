use physio_prep::config::{AllNulls, ImputePolicy, SomeNulls};
use physio_prep::impute::impute;
use physio_prep::means::GlobalMeans;
use proptest::prelude::*;

fn policy(some_nulls: SomeNulls, all_nulls: AllNulls) -> ImputePolicy {
    ImputePolicy {
        some_nulls,
        all_nulls,
    }
}

fn sparse_column() -> impl Strategy<Value = Vec<Option<f64>>> {
    proptest::collection::vec(proptest::option::of(-1000.0f64..1000.0), 1..40)
}

/// Index of the nearest observation at or before `idx`, else at or after.
fn nearest_known(column: &[Option<f64>], idx: usize) -> f64 {
    column[..=idx]
        .iter()
        .rev()
        .flatten()
        .next()
        .or_else(|| column[idx..].iter().flatten().next())
        .copied()
        .expect("column has at least one observation")
}

proptest! {
    #[test]
    fn output_is_dense_and_length_preserving(column in sparse_column()) {
        let means = GlobalMeans::default();
        for some_nulls in [SomeNulls::Ffill, SomeNulls::LinearInterpolate] {
            let out = impute(&column, "HR", policy(some_nulls, AllNulls::Zero), &means);
            prop_assert_eq!(out.len(), column.len());
            prop_assert!(out.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn fully_observed_columns_pass_through(values in proptest::collection::vec(-1000.0f64..1000.0, 1..40)) {
        let column: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        let means = GlobalMeans::default();
        let out = impute(&column, "HR", policy(SomeNulls::Ffill, AllNulls::Zero), &means);
        prop_assert_eq!(out, values);
    }

    #[test]
    fn ffill_uses_the_nearest_preceding_observation(column in sparse_column()) {
        prop_assume!(column.iter().any(Option::is_some));
        let means = GlobalMeans::default();
        let out = impute(&column, "HR", policy(SomeNulls::Ffill, AllNulls::Zero), &means);
        for (idx, value) in out.iter().enumerate() {
            let expected = match column[idx] {
                Some(observed) => observed,
                None => nearest_known(&column, idx),
            };
            prop_assert_eq!(*value, expected, "row {}", idx);
        }
    }

    #[test]
    fn interpolation_matches_the_linear_reference(column in sparse_column()) {
        prop_assume!(column.iter().any(Option::is_some));
        let means = GlobalMeans::default();
        let out = impute(
            &column,
            "HR",
            policy(SomeNulls::LinearInterpolate, AllNulls::Zero),
            &means,
        );
        for (idx, value) in out.iter().enumerate() {
            if let Some(observed) = column[idx] {
                prop_assert_eq!(*value, observed);
                continue;
            }
            let before = column[..idx].iter().enumerate().rev()
                .find_map(|(k, v)| v.map(|value| (k, value)));
            let after = column[idx + 1..].iter().enumerate()
                .find_map(|(k, v)| v.map(|value| (idx + 1 + k, value)));
            let expected = match (before, after) {
                (Some((pk, pv)), Some((nk, nv))) => {
                    pv + (nv - pv) * (idx - pk) as f64 / (nk - pk) as f64
                }
                (Some((_, pv)), None) => pv,
                (None, Some((_, nv))) => nv,
                (None, None) => unreachable!("assumed at least one observation"),
            };
            prop_assert!((value - expected).abs() <= 1e-9, "row {}: {} vs {}", idx, value, expected);
        }
    }

    #[test]
    fn unobserved_columns_take_the_mean_or_zero(len in 1usize..40) {
        let column = vec![None; len];
        let means: GlobalMeans = [("HR".to_string(), 80.5)].into_iter().collect();
        let with_mean = impute(&column, "HR", policy(SomeNulls::Ffill, AllNulls::GlobalMean), &means);
        prop_assert!(with_mean.iter().all(|v| *v == 80.5));
        let unknown = impute(&column, "Lactate", policy(SomeNulls::Ffill, AllNulls::GlobalMean), &means);
        prop_assert!(unknown.iter().all(|v| *v == 0.0));
        let zeroed = impute(&column, "HR", policy(SomeNulls::Ffill, AllNulls::Zero), &means);
        prop_assert!(zeroed.iter().all(|v| *v == 0.0));
    }
}
