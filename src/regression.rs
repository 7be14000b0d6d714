use crate::functions;
use thiserror::Error;

/// Result of a simple ordinary least squares fit `y ~ alpha + beta * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Intercept.
    pub alpha: f64,
    /// Slope.
    pub beta: f64,
    /// Mean squared error of the fitted line over the training samples.
    pub mse: f64,
}

/// Fits `y` against the single predictor `x` with closed-form OLS.
///
/// `x` and `y` must have the same length of at least two, and `x` must not be constant.
pub fn fit(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(FitError::TooFewSamples { len: x.len() });
    }

    // A rounded mean leaves a tiny nonzero variance, so constancy is checked on the values.
    if x.iter().all(|&v| v == x[0]) {
        return Err(FitError::ConstantPredictor);
    }

    let x_mean = functions::mean(x.iter().copied());
    let y_mean = functions::mean(y.iter().copied());
    let variance = functions::covariance(x, x, x_mean, x_mean);
    if variance == 0.0 || !variance.is_finite() {
        return Err(FitError::ConstantPredictor);
    }

    let beta = functions::covariance(x, y, x_mean, y_mean) / variance;
    let alpha = y_mean - beta * x_mean;
    let mse = functions::mean_squared_residual(x, y, alpha, beta);
    Ok(LinearFit { alpha, beta, mse })
}

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("predictor and target lengths differ ({x} != {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("regression needs at least two samples, got {len}")]
    TooFewSamples { len: usize },

    #[error("predictor has zero (or non finite) variance")]
    ConstantPredictor,
}
