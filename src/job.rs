use crate::regression::{self, FitError, LinearFit};
use crate::table::Table;
use std::fmt;
use thiserror::Error;

/// Regression of one feature column against the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureFit {
    pub feature: usize,
    pub alpha: f64,
    pub beta: f64,
    pub mse: f64,
}

impl FeatureFit {
    fn new(feature: usize, fit: LinearFit) -> Self {
        Self {
            feature,
            alpha: fit.alpha,
            beta: fit.beta,
            mse: fit.mse,
        }
    }

    /// Formats this fit as a console line, labeled with the table's feature name if any.
    pub fn display<'a>(&'a self, table: &'a Table) -> impl 'a + fmt::Display {
        DisplayFit { fit: self, table }
    }
}

impl fmt::Display for FeatureFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Feature {}: Alpha: {:.6}, Beta: {:.6}, MSE: {:.6}",
            self.feature, self.alpha, self.beta, self.mse
        )
    }
}

struct DisplayFit<'a> {
    fit: &'a FeatureFit,
    table: &'a Table,
}

impl fmt::Display for DisplayFit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.feature_name(self.fit.feature) {
            Some(name) => write!(
                f,
                "Feature {} ({}): Alpha: {:.6}, Beta: {:.6}, MSE: {:.6}",
                self.fit.feature, name, self.fit.alpha, self.fit.beta, self.fit.mse
            ),
            None => fmt::Display::fmt(self.fit, f),
        }
    }
}

/// Unit of work: fit column `feature` of a table against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureJob {
    feature: usize,
}

impl FeatureJob {
    pub const fn new(feature: usize) -> Self {
        Self { feature }
    }

    pub fn run(&self, table: &Table) -> Result<FeatureFit, JobError> {
        let x = table.column(self.feature).collect::<Vec<_>>();
        regression::fit(&x, table.target())
            .map(|fit| FeatureFit::new(self.feature, fit))
            .map_err(|source| JobError {
                feature: self.feature,
                source,
            })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot fit feature {feature}")]
pub struct JobError {
    pub feature: usize,
    #[source]
    pub source: FitError,
}
