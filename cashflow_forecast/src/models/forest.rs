//! Random forest forecaster over rolling-statistics features
//!
//! Training drops warm-up rows, standardizes the remaining feature rows and
//! fits a bagged tree ensemble against the same month's net cash flow.
//! Forecasting is iterative: each prediction is fed back into the net mean
//! features before the next step.

use crate::aggregate::MonthlyHistory;
use crate::config::{ForecastConfig, UpdateRule};
use crate::error::{ForecastError, Result};
use crate::features::{CashSeries, FeatureColumn, FeatureSet, FeatureVector};
use crate::models::{CashflowModel, ForecastResult, TrainedCashflowModel};
use cashflow_math::{FittedScaler, ForestConfig, RandomForestRegressor, StandardScaler};
use tracing::debug;

/// Untrained random forest forecaster
#[derive(Debug, Clone)]
pub struct ForestForecaster {
    name: String,
    forest: ForestConfig,
    min_training_rows: usize,
    update_rule: UpdateRule,
}

/// Fitted scaler and ensemble, produced by [`ForestForecaster::train`]
#[derive(Debug, Clone)]
pub struct TrainedForestForecaster {
    name: String,
    columns: Vec<FeatureColumn>,
    scaler: FittedScaler,
    forest: RandomForestRegressor,
    update_rule: UpdateRule,
    fitted_values: Vec<f64>,
}

impl ForestForecaster {
    /// Create a forecaster; `min_training_rows` must be at least 1
    pub fn new(forest: ForestConfig, min_training_rows: usize, update_rule: UpdateRule) -> Result<Self> {
        if min_training_rows == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_training_rows must be at least 1".to_string(),
            ));
        }
        forest
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            name: format!("Random Forest ({} trees, seed={})", forest.n_trees, forest.seed),
            forest,
            min_training_rows,
            update_rule,
        })
    }

    /// Create a forecaster from the pipeline configuration
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(config.forest.clone(), config.min_training_rows, config.update_rule)
    }
}

impl CashflowModel for ForestForecaster {
    type Trained = TrainedForestForecaster;

    fn train(&self, history: &MonthlyHistory, features: &FeatureSet) -> Result<Self::Trained> {
        if features.len() != history.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature rows ({}) must align with history months ({})",
                features.len(),
                history.len()
            )));
        }

        let rows: Vec<Vec<f64>> = features
            .rows()
            .iter()
            .filter_map(FeatureVector::to_dense)
            .collect();
        if rows.len() < self.min_training_rows {
            return Err(ForecastError::InsufficientDataError(format!(
                "{} training rows remain after feature warm-up, at least {} required",
                rows.len(),
                self.min_training_rows
            )));
        }

        let nets = history.nets();
        let targets = nets[nets.len() - rows.len()..].to_vec();

        let scaler = StandardScaler::new().fit(&rows)?;
        let scaled = scaler.transform_rows(&rows)?;
        let forest = RandomForestRegressor::fit(&self.forest, &scaled, &targets)?;
        let fitted_values = forest.predict(&scaled)?;

        debug!(
            training_rows = rows.len(),
            features = features.columns().len(),
            trees = forest.n_trees(),
            "trained random forest forecaster"
        );

        Ok(TrainedForestForecaster {
            name: self.name.clone(),
            columns: features.columns().to_vec(),
            scaler,
            forest,
            update_rule: self.update_rule,
            fitted_values,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForestForecaster {
    /// Fitted feature scaler
    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    /// Fitted ensemble
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    /// Feature importances keyed by column name
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        self.columns
            .iter()
            .map(FeatureColumn::name)
            .zip(self.forest.feature_importances().iter().copied())
            .collect()
    }

    /// Advance the feature vector after a prediction.
    ///
    /// Only the net mean columns move; inflow/outflow means, every std column
    /// and the seasonal column are carried forward unchanged.
    fn advance(&self, current: &mut [f64], prediction: f64, extended_net: &[f64]) {
        for (value, column) in current.iter_mut().zip(&self.columns) {
            let FeatureColumn::Mean {
                series: CashSeries::Net,
                window,
            } = *column
            else {
                continue;
            };
            let w = window as f64;
            *value = match self.update_rule {
                UpdateRule::IncrementalMean => (*value * (w - 1.0) + prediction) / w,
                UpdateRule::Recompute => {
                    let tail = &extended_net[extended_net.len().saturating_sub(window)..];
                    tail.iter().sum::<f64>() / tail.len() as f64
                }
            };
        }
    }
}

impl TrainedCashflowModel for TrainedForestForecaster {
    fn forecast(
        &self,
        history: &MonthlyHistory,
        features: &FeatureSet,
        horizon: usize,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 month".to_string(),
            ));
        }
        if features.columns() != self.columns.as_slice() {
            return Err(ForecastError::InvalidParameter(
                "Feature columns differ from the ones the model was trained on".to_string(),
            ));
        }

        let mut current = features
            .rows()
            .last()
            .and_then(FeatureVector::to_dense)
            .ok_or_else(|| {
                ForecastError::InsufficientDataError(
                    "The most recent month has undefined features".to_string(),
                )
            })?;
        let seasonal = features.seasonal_pattern();
        let mut extended_net = history.nets();
        let mut values = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let scaled = self.scaler.transform(&current)?;
            let mut prediction = self.forest.predict_one(&scaled)?;
            if let Some(pattern) = seasonal {
                prediction += pattern.at(step);
            }

            values.push(prediction);
            extended_net.push(prediction);
            self.advance(&mut current, prediction, &extended_net);
        }

        ForecastResult::new(values, history.last_month())
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted_values
    }

    fn name(&self) -> &str {
        &self.name
    }
}
