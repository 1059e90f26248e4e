//! Rolling-statistics features and the seasonal pattern
//!
//! For every window `w` the builder emits, in this order,
//! `inflow_mean_w, outflow_mean_w, net_mean_w, inflow_std_w, outflow_std_w`,
//! followed by a `seasonal` column when the history spans a full seasonal
//! cycle. Values are `None` until the window has warmed up.

use crate::aggregate::MonthlyHistory;
use crate::config::FeatureConfig;
use crate::error::{ForecastError, Result};
use cashflow_math::{decompose_additive, rolling_mean, rolling_std};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Monthly series a rolling statistic is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CashSeries {
    Inflow,
    Outflow,
    Net,
}

impl CashSeries {
    fn as_str(&self) -> &'static str {
        match self {
            CashSeries::Inflow => "inflow",
            CashSeries::Outflow => "outflow",
            CashSeries::Net => "net",
        }
    }
}

/// What a feature column measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FeatureColumn {
    /// Trailing mean of `series` over `window` months
    Mean { series: CashSeries, window: usize },
    /// Trailing sample standard deviation of `series` over `window` months
    Std { series: CashSeries, window: usize },
    /// Seasonal component of the net series
    Seasonal,
}

impl FeatureColumn {
    /// Column name such as `net_mean_6` or `seasonal`
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureColumn::Mean { series, window } => write!(f, "{}_mean_{}", series.as_str(), window),
            FeatureColumn::Std { series, window } => write!(f, "{}_std_{}", series.as_str(), window),
            FeatureColumn::Seasonal => write!(f, "seasonal"),
        }
    }
}

/// Feature values for one month; `None` marks a statistic still in warm-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<Option<f64>>,
}

impl FeatureVector {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, column: usize) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    /// Whether every feature is defined
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// All values, or `None` if any feature is undefined
    pub fn to_dense(&self) -> Option<Vec<f64>> {
        self.values.iter().copied().collect()
    }
}

/// Twelve (one per phase of the cycle) seasonal offsets, reused cyclically
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeasonalPattern {
    values: Vec<f64>,
}

impl SeasonalPattern {
    /// Build a pattern from per-phase offsets
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Seasonal pattern needs at least one value".to_string(),
            ));
        }
        Ok(Self { values })
    }

    /// Offset for forecast step `step` (`values[step % period]`)
    pub fn at(&self, step: usize) -> f64 {
        self.values[step % self.values.len()]
    }

    pub fn period(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Feature matrix aligned 1:1 with the monthly history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    columns: Vec<FeatureColumn>,
    rows: Vec<FeatureVector>,
    seasonal: Option<SeasonalPattern>,
}

impl FeatureSet {
    /// Assemble a feature set, checking row widths
    pub fn new(
        columns: Vec<FeatureColumn>,
        rows: Vec<FeatureVector>,
        seasonal: Option<SeasonalPattern>,
    ) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.values().len() != columns.len()) {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature row has {} values for {} columns",
                row.values().len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            rows,
            seasonal,
        })
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(FeatureColumn::name).collect()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Seasonal pattern, present only when the history covered a full cycle
    pub fn seasonal_pattern(&self) -> Option<&SeasonalPattern> {
        self.seasonal.as_ref()
    }

    /// Index of a column, if present
    pub fn column_index(&self, column: &FeatureColumn) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column across all rows
    pub fn column_values(&self, column: &FeatureColumn) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row.get(index)).collect())
    }

    /// Number of rows with every feature defined
    pub fn complete_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.is_complete()).count()
    }
}

/// Derives rolling statistics and the seasonal component from monthly history
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Columns produced for the configured windows, excluding `seasonal`
    pub fn rolling_columns(&self) -> Vec<FeatureColumn> {
        self.config
            .windows
            .iter()
            .flat_map(|&window| {
                [
                    FeatureColumn::Mean { series: CashSeries::Inflow, window },
                    FeatureColumn::Mean { series: CashSeries::Outflow, window },
                    FeatureColumn::Mean { series: CashSeries::Net, window },
                    FeatureColumn::Std { series: CashSeries::Inflow, window },
                    FeatureColumn::Std { series: CashSeries::Outflow, window },
                ]
            })
            .collect()
    }

    /// Build the feature matrix and, for histories spanning a full cycle,
    /// the seasonal pattern
    pub fn build(&self, history: &MonthlyHistory) -> Result<FeatureSet> {
        if self.config.windows.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one rolling window is required".to_string(),
            ));
        }

        let inflow = history.inflows();
        let outflow = history.outflows();
        let net = history.nets();

        let mut columns = Vec::with_capacity(self.config.windows.len() * 5 + 1);
        let mut column_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.capacity());
        for &window in &self.config.windows {
            let window_columns = [
                (FeatureColumn::Mean { series: CashSeries::Inflow, window }, rolling_mean(&inflow, window)?),
                (FeatureColumn::Mean { series: CashSeries::Outflow, window }, rolling_mean(&outflow, window)?),
                (FeatureColumn::Mean { series: CashSeries::Net, window }, rolling_mean(&net, window)?),
                (FeatureColumn::Std { series: CashSeries::Inflow, window }, rolling_std(&inflow, window)?),
                (FeatureColumn::Std { series: CashSeries::Outflow, window }, rolling_std(&outflow, window)?),
            ];
            for (column, values) in window_columns {
                columns.push(column);
                column_values.push(values);
            }
        }

        let period = self.config.seasonal_period;
        let seasonal = if history.len() >= period {
            let decomposition = decompose_additive(&net, period)?;
            columns.push(FeatureColumn::Seasonal);
            column_values.push(decomposition.seasonal.iter().copied().map(Some).collect());
            Some(SeasonalPattern::new(decomposition.pattern)?)
        } else {
            debug!(
                months = history.len(),
                period, "history shorter than a seasonal cycle, seasonal feature omitted"
            );
            None
        };

        let rows: Vec<FeatureVector> = (0..history.len())
            .map(|i| FeatureVector::new(column_values.iter().map(|values| values[i]).collect()))
            .collect();

        let features = FeatureSet::new(columns, rows, seasonal)?;
        debug!(
            rows = features.len(),
            columns = features.columns().len(),
            complete_rows = features.complete_rows(),
            seasonal = features.seasonal_pattern().is_some(),
            "built feature matrix"
        );
        Ok(features)
    }
}
