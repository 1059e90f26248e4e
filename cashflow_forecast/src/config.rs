//! Forecast configuration
//!
//! Every policy constant of the pipeline lives here. [`ForecastConfig::default`]
//! reproduces the standard behavior; a TOML file and `CASHFLOW__*` environment
//! variables can override individual fields.

use crate::error::{ForecastError, Result};
use cashflow_math::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of forecast months
pub const DEFAULT_HORIZON: usize = 12;

/// Default rolling windows, in months
pub const DEFAULT_WINDOWS: [usize; 3] = [3, 6, 12];

/// Default seasonal cycle length, in months
pub const DEFAULT_SEASONAL_PERIOD: usize = 12;

/// Default minimum number of training rows left after warm-up
pub const DEFAULT_MIN_TRAINING_ROWS: usize = 3;

/// How calendar months without transactions are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Insert a zero row for every empty month between the first and last month
    #[default]
    ZeroFill,
    /// Leave empty months out of the aggregate
    Skip,
}

/// How the feature vector is advanced after each forecast step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// `new_mean_w = (old_mean_w * (w - 1) + prediction) / w` on the net means only
    #[default]
    IncrementalMean,
    /// Recompute the net means over history extended with the predictions so far
    Recompute,
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CASHFLOW")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Feature construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rolling window sizes, in months
    pub windows: Vec<usize>,
    /// Seasonal cycle length; decomposition runs once the history has this many months
    pub seasonal_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            seasonal_period: DEFAULT_SEASONAL_PERIOD,
        }
    }
}

/// Multipliers applied to the baseline forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFactors {
    pub baseline: f64,
    pub optimistic: f64,
    pub pessimistic: f64,
    pub severe_stress: f64,
}

impl Default for ScenarioFactors {
    fn default() -> Self {
        Self {
            baseline: 1.0,
            optimistic: 1.2,
            pessimistic: 0.8,
            severe_stress: 0.6,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of months to forecast
    pub horizon: usize,
    /// Treatment of months without transactions
    pub gap_policy: GapPolicy,
    /// Rolling-window and seasonal settings
    pub features: FeatureConfig,
    /// Ensemble regressor settings
    pub forest: ForestConfig,
    /// Minimum training rows after warm-up rows are dropped
    pub min_training_rows: usize,
    /// Feature self-update rule used while forecasting
    pub update_rule: UpdateRule,
    /// Scenario multipliers
    pub scenarios: ScenarioFactors,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            gap_policy: GapPolicy::default(),
            features: FeatureConfig::default(),
            forest: ForestConfig::default(),
            min_training_rows: DEFAULT_MIN_TRAINING_ROWS,
            update_rule: UpdateRule::default(),
            scenarios: ScenarioFactors::default(),
        }
    }
}

impl ForecastConfig {
    /// Load configuration from a TOML file, overlaid with `CASHFLOW__*`
    /// environment variables (e.g. `CASHFLOW__HORIZON=6`,
    /// `CASHFLOW__FOREST__N_TREES=50`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment())
            .build()?;
        let config: ForecastConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`ForecastConfig::load`] but falls back to defaults plus the
    /// environment when no file is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let settings = config::Config::builder()
                    .add_source(environment())
                    .build()?;
                let config: ForecastConfig = settings.try_deserialize()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Override the forecast horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 month".to_string(),
            ));
        }
        if self.features.windows.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one rolling window is required".to_string(),
            ));
        }
        if let Some(window) = self.features.windows.iter().find(|&&w| w < 2) {
            return Err(ForecastError::InvalidParameter(format!(
                "Rolling windows must span at least 2 months, got {}",
                window
            )));
        }
        if self.features.seasonal_period < 2 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be at least 2 months".to_string(),
            ));
        }
        if self.min_training_rows == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_training_rows must be at least 1".to_string(),
            ));
        }
        let factors = [
            self.scenarios.baseline,
            self.scenarios.optimistic,
            self.scenarios.pessimistic,
            self.scenarios.severe_stress,
        ];
        if factors.iter().any(|f| !f.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Scenario factors must be finite".to_string(),
            ));
        }
        self.forest
            .validate()
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))
    }
}
