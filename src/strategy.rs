use crate::job::{FeatureFit, FeatureJob, JobError};
use crate::orchestrator::Orchestrator;
use crate::table::Table;
use itertools::{EitherOrBoth, Itertools as _};
use ordered_float::OrderedFloat;
use std::fmt;

/// How a fit-all-features pass is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// One feature after another, in index order, on the calling thread.
    Sequential,
    /// One task per feature, all in flight at once.
    Concurrent,
}

impl Strategy {
    pub fn fit_all(
        self,
        orchestrator: &Orchestrator,
        table: &Table,
    ) -> Result<Vec<FeatureFit>, JobError> {
        match self {
            Self::Sequential => fit_all_sequential(table),
            Self::Concurrent => orchestrator.fit_all(table),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Reference path: fits features `0..k` in order on the calling thread.
pub fn fit_all_sequential(table: &Table) -> Result<Vec<FeatureFit>, JobError> {
    (0..table.features_len())
        .map(|feature| FeatureJob::new(feature).run(table))
        .collect()
}

/// Returns `true` if both result sets cover the same features with coefficients and MSE
/// equal up to `tolerance` (relative to the larger magnitude, absolute near zero).
pub fn results_agree(a: &[FeatureFit], b: &[FeatureFit], tolerance: f64) -> bool {
    let close = |x: f64, y: f64| (x - y).abs() <= tolerance * x.abs().max(y.abs()).max(1.0);
    a.iter()
        .sorted_by_key(|f| f.feature)
        .zip_longest(b.iter().sorted_by_key(|f| f.feature))
        .all(|pair| match pair {
            EitherOrBoth::Both(x, y) => {
                x.feature == y.feature
                    && close(x.alpha, y.alpha)
                    && close(x.beta, y.beta)
                    && close(x.mse, y.mse)
            }
            _ => false,
        })
}

/// Feature whose single-predictor fit has the lowest MSE.
pub fn best_predictor(fits: &[FeatureFit]) -> Option<&FeatureFit> {
    fits.iter().min_by_key(|f| OrderedFloat(f.mse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(feature: usize, alpha: f64, beta: f64, mse: f64) -> FeatureFit {
        FeatureFit {
            feature,
            alpha,
            beta,
            mse,
        }
    }

    #[test]
    fn sequential_results_are_in_index_order() -> Result<(), anyhow::Error> {
        let table = Table::new(vec![
            vec![1.0, 2.0, 10.0],
            vec![2.0, 3.0, 13.0],
            vec![3.0, 4.0, 16.0],
        ])?;
        let fits = fit_all_sequential(&table)?;
        assert_eq!(fits.iter().map(|f| f.feature).collect::<Vec<_>>(), [0, 1]);
        assert!((fits[0].alpha - 7.0).abs() < 1e-9);
        assert!((fits[1].alpha - 4.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn both_strategies_produce_the_same_fits() -> Result<(), anyhow::Error> {
        let table = Table::new(vec![
            vec![0.3, 9.0, -1.0, 4.0],
            vec![1.7, 2.0, 0.5, 1.5],
            vec![2.2, 4.5, 3.0, 2.5],
            vec![5.1, 1.0, 2.0, 8.0],
        ])?;
        let orchestrator = Orchestrator::new();
        let sequential = Strategy::Sequential.fit_all(&orchestrator, &table)?;
        let concurrent = Strategy::Concurrent.fit_all(&orchestrator, &table)?;
        assert!(results_agree(&sequential, &concurrent, 1e-9));
        Ok(())
    }

    #[test]
    fn sequential_stops_at_first_failure() -> Result<(), anyhow::Error> {
        let table = Table::new(vec![vec![1.0, 1.0, 1.0], vec![2.0, 1.0, 2.0]])?;
        assert_eq!(fit_all_sequential(&table).unwrap_err().feature, 1);
        Ok(())
    }

    #[test]
    fn agreement_ignores_order_but_not_values() {
        let a = [fit(0, 1.0, 2.0, 0.5), fit(1, -3.0, 0.25, 1e-12)];
        let b = [fit(1, -3.0, 0.25, 0.0), fit(0, 1.0 + 1e-12, 2.0, 0.5)];
        assert!(results_agree(&a, &b, 1e-9));

        let c = [fit(0, 1.0, 2.0, 0.5), fit(1, -3.0, 0.26, 0.0)];
        assert!(!results_agree(&a, &c, 1e-9));
        assert!(!results_agree(&a, &a[..1], 1e-9));
        assert!(results_agree(&[], &[], 1e-9));
    }

    #[test]
    fn best_predictor_has_lowest_mse() {
        let fits = [fit(0, 0.0, 1.0, 3.0), fit(1, 0.0, 1.0, 0.5), fit(2, 0.0, 1.0, 2.0)];
        assert_eq!(best_predictor(&fits).map(|f| f.feature), Some(1));
        assert_eq!(best_predictor(&[]), None);
    }

    #[test]
    fn strategy_names_round_trip() {
        for s in [Strategy::Sequential, Strategy::Concurrent] {
            assert_eq!(
                <Strategy as clap::ValueEnum>::from_str(&s.to_string(), false),
                Ok(s)
            );
        }
        assert!(<Strategy as clap::ValueEnum>::from_str("parallel", false).is_err());
    }
}
