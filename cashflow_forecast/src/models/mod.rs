//! Forecasting models for monthly net cash flow

use crate::aggregate::MonthlyHistory;
use crate::error::{ForecastError, Result};
use crate::features::FeatureSet;
use crate::utils::{following_months, MonthKey};
use serde::Serialize;
use std::fmt::Debug;

/// Predicted net cash flow for one future month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// 0 = first month after the history
    pub step: usize,
    pub month: MonthKey,
    pub net: f64,
}

/// Ordered forecast over a horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Label `values` with the months following `last_month`
    pub fn new(values: Vec<f64>, last_month: MonthKey) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "A forecast needs at least one value".to_string(),
            ));
        }
        let months = following_months(last_month, values.len());
        let points = values
            .into_iter()
            .zip(months)
            .enumerate()
            .map(|(step, (net, month))| ForecastPoint { step, month, net })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Forecasted net values in step order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.net).collect()
    }

    /// Forecast months in step order
    pub fn months(&self) -> Vec<MonthKey> {
        self.points.iter().map(|p| p.month).collect()
    }

    /// Number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.points.len()
    }
}

/// Trained cash flow model
pub trait TrainedCashflowModel: Debug {
    /// Project `horizon` months past the end of `history`
    fn forecast(
        &self,
        history: &MonthlyHistory,
        features: &FeatureSet,
        horizon: usize,
    ) -> Result<ForecastResult>;

    /// In-sample predictions for the rows the model was trained on
    fn fitted_values(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Cash flow model that can be trained on a monthly history and its features
pub trait CashflowModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedCashflowModel;

    /// Train the model. Training never mutates `self`; every call returns an
    /// independent trained value.
    fn train(&self, history: &MonthlyHistory, features: &FeatureSet) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod forest;

pub use forest::{ForestForecaster, TrainedForestForecaster};
