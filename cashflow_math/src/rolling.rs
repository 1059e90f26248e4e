//! Trailing-window statistics
//!
//! Values are reported as `None` until the window has been filled, so callers
//! can tell a warm-up row apart from a genuine zero.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Fixed-size trailing window over a stream of values
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// Create a new rolling window with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value, evicting the oldest one once the window is full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Whether `period` values have been seen
    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    /// Mean of the window, `None` during warm-up
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        // Recompute from the buffer: the running sum drifts on long streams.
        Some(self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Sample standard deviation (n - 1) of the window, `None` during warm-up
    /// or when the period is 1
    pub fn std_dev(&self) -> Option<f64> {
        if !self.is_full() || self.period < 2 {
            return None;
        }
        let mean = self.values.iter().sum::<f64>() / self.period as f64;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / (self.period - 1) as f64;
        Some(variance.sqrt())
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Running sum of the values currently in the window
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Reset the window, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Trailing mean over `window` values for every position of `series`
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingWindow::new(window)?;
    Ok(series
        .iter()
        .map(|&value| {
            rolling.push(value);
            rolling.mean()
        })
        .collect())
}

/// Trailing sample standard deviation over `window` values for every position of `series`
pub fn rolling_std(series: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingWindow::new(window)?;
    Ok(series
        .iter()
        .map(|&value| {
            rolling.push(value);
            rolling.std_dev()
        })
        .collect())
}
