//! Summary statistics that report undefined results instead of producing NaN
//! or infinity.

use statrs::statistics::Statistics;

/// Denominators with an absolute value below this are treated as zero
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean, `None` for an empty series
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().mean())
}

/// Sample standard deviation (n - 1), `None` for fewer than two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    finite(values.iter().std_dev())
}

/// Population standard deviation (n), `None` for an empty series
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().population_std_dev())
}

/// Pearson correlation coefficient between two equally long series.
///
/// `None` when the lengths differ, there are fewer than two points, or either
/// series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let std_x = sample_std(x)?;
    let std_y = sample_std(y)?;
    let covariance = x.iter().covariance(y.iter());
    safe_div(covariance, std_x * std_y)
}

/// `numerator / denominator`, `None` when the denominator is zero or the
/// quotient is not finite
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() < ZERO_TOLERANCE {
        return None;
    }
    finite(numerator / denominator)
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
