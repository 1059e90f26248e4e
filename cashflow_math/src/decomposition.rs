//! Additive classical seasonal decomposition
//!
//! `y = trend + seasonal + residual`. The trend is a centered moving average
//! whose missing edges are extrapolated linearly, so every observation gets a
//! seasonal estimate.

use crate::{MathError, Result};

/// Output of [`decompose_additive`]
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Trend component, one value per observation
    pub trend: Vec<f64>,
    /// Seasonal component, one value per observation
    pub seasonal: Vec<f64>,
    /// Residual component, one value per observation
    pub residual: Vec<f64>,
    /// Seasonal averages per phase; `pattern[i]` belongs to observations with `index % period == i`
    pub pattern: Vec<f64>,
    /// Length of the seasonal cycle
    pub period: usize,
}

/// Decompose `data` into trend, seasonal and residual components.
///
/// Requires at least one full cycle. When the history is too short for the
/// centered moving average to produce two points, the trend falls back to a
/// least-squares line over the whole series.
pub fn decompose_additive(data: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(MathError::InvalidInput(
            "Seasonal period must be at least 2".to_string(),
        ));
    }
    let n = data.len();
    if n < period {
        return Err(MathError::InsufficientData(format!(
            "Seasonal decomposition needs at least {} observations, have {}",
            period, n
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contains non-finite values".to_string(),
        ));
    }

    let centered = centered_moving_average(data, period);
    let defined = centered.iter().filter(|v| v.is_some()).count();
    let trend = if defined >= 2 {
        extrapolate_trend(&centered, period)?
    } else {
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let (slope, intercept) = fit_line(&xs, data)?;
        xs.iter().map(|x| intercept + slope * x).collect()
    };

    let detrended: Vec<f64> = data.iter().zip(&trend).map(|(y, t)| y - t).collect();

    let mut pattern = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, value) in detrended.iter().enumerate() {
        pattern[i % period] += value;
        counts[i % period] += 1;
    }
    for (average, count) in pattern.iter_mut().zip(&counts) {
        *average /= *count as f64;
    }
    let pattern_mean = pattern.iter().sum::<f64>() / period as f64;
    for average in &mut pattern {
        *average -= pattern_mean;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| pattern[i % period]).collect();
    let residual: Vec<f64> = data
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((y, t), s)| y - t - s)
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
        pattern,
        period,
    })
}

/// Centered moving average. Even periods use the 2 x period filter with half
/// weights on both ends.
fn centered_moving_average(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = data.len();
    let half = period / 2;
    let mut trend = vec![None; n];
    if n < 2 * half + 1 {
        return trend;
    }

    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &data[i - half..=i + half];
        let value = if period % 2 == 0 {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            (inner + 0.5 * (window[0] + window[window.len() - 1])) / period as f64
        } else {
            window.iter().sum::<f64>() / period as f64
        };
        *slot = Some(value);
    }
    trend
}

/// Fill the undefined edges of a centered trend with least-squares lines fitted
/// on up to `npoints` trend values nearest to each edge.
fn extrapolate_trend(trend: &[Option<f64>], npoints: usize) -> Result<Vec<f64>> {
    let known: Vec<(usize, f64)> = trend
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let (front, back) = match (known.first(), known.last()) {
        (Some(&(front, _)), Some(&(back, _))) => (front, back),
        _ => {
            return Err(MathError::InsufficientData(
                "Trend has no values to extrapolate from".to_string(),
            ))
        }
    };
    let take = npoints.min(known.len());

    let (head_x, head_y): (Vec<f64>, Vec<f64>) =
        known[..take].iter().map(|&(i, v)| (i as f64, v)).unzip();
    let (front_slope, front_intercept) = fit_line(&head_x, &head_y)?;

    let (tail_x, tail_y): (Vec<f64>, Vec<f64>) = known[known.len() - take..]
        .iter()
        .map(|&(i, v)| (i as f64, v))
        .unzip();
    let (back_slope, back_intercept) = fit_line(&tail_x, &tail_y)?;

    Ok(trend
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            Some(v) => *v,
            None if i < front => front_intercept + front_slope * i as f64,
            None => {
                debug_assert!(i > back);
                back_intercept + back_slope * i as f64
            }
        })
        .collect())
}

/// Ordinary least-squares line `y = intercept + slope * x`, returned as `(slope, intercept)`
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Err(MathError::InsufficientData(
            "Line fit needs at least two paired points".to_string(),
        ));
    }
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }

    if denominator.abs() < 1e-12 {
        return Err(MathError::CalculationError(
            "Cannot fit a line: x values are identical".to_string(),
        ));
    }

    let slope = numerator / denominator;
    Ok((slope, y_mean - slope * x_mean))
}
