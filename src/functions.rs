pub fn mean(xs: impl Iterator<Item = f64>) -> f64 {
    let mut count = 0;
    let mut total = 0.0;
    for x in xs {
        count += 1;
        total += x;
    }
    assert_ne!(count, 0);
    total / count as f64
}

/// Population covariance of `xs` and `ys` around the given means.
pub fn covariance(xs: &[f64], ys: &[f64], x_mean: f64, y_mean: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len() as f64;
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| (x - x_mean) * (y - y_mean))
        .sum::<f64>()
        / n
}

pub fn mean_squared_residual(xs: &[f64], ys: &[f64], alpha: f64, beta: f64) -> f64 {
    mean(
        xs.iter()
            .zip(ys.iter())
            .map(|(&x, &y)| (y - (alpha + beta * x)).powi(2)),
    )
}
