//! Z-score standardization of feature matrices

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Column scales below this are treated as zero variance
const MIN_SCALE: f64 = 1e-12;

/// Standardizes each column to zero mean and unit variance.
///
/// Fitting does not mutate the scaler; it returns a [`FittedScaler`] holding the
/// learned parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

/// Per-column mean and scale learned by [`StandardScaler::fit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self
    }

    /// Learn column means and population standard deviations from `rows`.
    ///
    /// Constant columns get a scale of 1.0 so they transform to zero.
    pub fn fit(&self, rows: &[Vec<f64>]) -> Result<FittedScaler> {
        let first = rows.first().ok_or_else(|| {
            MathError::InsufficientData("Cannot fit a scaler on zero rows".to_string())
        })?;
        let width = first.len();
        if width == 0 {
            return Err(MathError::InvalidInput(
                "Cannot fit a scaler on rows without columns".to_string(),
            ));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != width) {
            return Err(MathError::InvalidInput(format!(
                "Ragged feature matrix: expected {} columns, found a row with {}",
                width,
                row.len()
            )));
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((scale, mean), value) in scales.iter_mut().zip(&means).zip(row) {
                *scale += (value - mean).powi(2);
            }
        }
        for scale in &mut scales {
            *scale = (*scale / n).sqrt();
            if *scale < MIN_SCALE {
                *scale = 1.0;
            }
        }

        Ok(FittedScaler { means, scales })
    }
}

impl FittedScaler {
    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Column means
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Column scales (population standard deviations, 1.0 for constant columns)
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize a single row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(MathError::InvalidInput(format!(
                "Scaler was fitted on {} columns, got {}",
                self.means.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .map(|((value, mean), scale)| (value - mean) / scale)
            .collect())
    }

    /// Standardize every row of a matrix
    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_transform_centers_and_scales() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::new().fit(&rows).unwrap();
        let scaled = scaler.transform_rows(&rows).unwrap();

        for column in 0..2 {
            let values: Vec<f64> = scaled.iter().map(|r| r[column]).collect();
            let mean = values.iter().sum::<f64>() / 3.0;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
            assert_relative_eq!(variance, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0]];
        let scaler = StandardScaler::new().fit(&rows).unwrap();
        assert_relative_eq!(scaler.scales()[0], 1.0);
        assert_relative_eq!(scaler.transform(&[5.0, 1.5]).unwrap()[0], 0.0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let scaler = StandardScaler::new();
        assert!(scaler.fit(&[]).is_err());
        assert!(scaler.fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());

        let fitted = scaler.fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(fitted.transform(&[1.0]).is_err());
    }
}
