//! End-to-end forecast pipeline and the response it produces
//!
//! Aggregator -> FeatureBuilder -> train -> forecast -> scenarios, with risk
//! metrics computed separately on the aggregated history. Every run builds its
//! own model state; nothing is cached between runs.

use crate::aggregate::{Aggregator, MonthlyAggregate, MonthlyHistory};
use crate::config::ForecastConfig;
use crate::data::{Transaction, TransactionLoader};
use crate::error::Result;
use crate::features::FeatureBuilder;
use crate::metrics::{RiskMetrics, RiskMetricsCalculator};
use crate::models::{CashflowModel, ForecastResult, ForestForecaster, TrainedCashflowModel};
use crate::scenarios::{ScenarioGenerator, ScenarioSet};
use crate::utils::MonthKey;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One forecast month with every scenario value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub month: MonthKey,
    pub baseline: f64,
    pub optimistic: f64,
    pub pessimistic: f64,
    pub severe_stress: f64,
}

/// Structured result handed to the transport layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub historical_data: Vec<MonthlyAggregate>,
    pub forecast_data: Vec<ForecastRecord>,
    pub risk_metrics: RiskMetrics,
}

impl ForecastReport {
    /// Assemble a report from the pipeline outputs
    pub fn new(
        history: &MonthlyHistory,
        forecast: &ForecastResult,
        scenarios: &ScenarioSet,
        risk_metrics: RiskMetrics,
    ) -> Self {
        let forecast_data = forecast
            .months()
            .into_iter()
            .enumerate()
            .map(|(i, month)| ForecastRecord {
                month,
                baseline: scenarios.baseline[i],
                optimistic: scenarios.optimistic[i],
                pessimistic: scenarios.pessimistic[i],
                severe_stress: scenarios.severe_stress[i],
            })
            .collect();

        Self {
            historical_data: history.months().to_vec(),
            forecast_data,
            risk_metrics,
        }
    }

    /// Compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the forecast table as CSV with a header row
    pub fn write_forecast_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.forecast_data {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Runs the whole forecasting pipeline for one request
#[derive(Debug, Clone, Default)]
pub struct CashflowForecaster {
    config: ForecastConfig,
}

impl CashflowForecaster {
    /// Create a forecaster after validating `config`
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast from a CSV file on disk
    pub fn forecast_csv<P: AsRef<Path>>(&self, path: P) -> Result<ForecastReport> {
        let transactions = TransactionLoader::from_csv(path)?;
        self.forecast_transactions(&transactions)
    }

    /// Forecast from an already parsed transaction table
    pub fn forecast_dataframe(&self, df: &DataFrame) -> Result<ForecastReport> {
        let transactions = TransactionLoader::from_dataframe(df)?;
        self.forecast_transactions(&transactions)
    }

    /// Forecast from transaction records
    pub fn forecast_transactions(&self, transactions: &[Transaction]) -> Result<ForecastReport> {
        let history = Aggregator::new(self.config.gap_policy).aggregate(transactions)?;
        self.forecast_history(&history)
    }

    /// Forecast from an aggregated monthly history
    pub fn forecast_history(&self, history: &MonthlyHistory) -> Result<ForecastReport> {
        let features = FeatureBuilder::new(self.config.features.clone()).build(history)?;

        let model = ForestForecaster::from_config(&self.config)?;
        let trained = model.train(history, &features)?;
        let forecast = trained.forecast(history, &features, self.config.horizon)?;

        let scenarios = ScenarioGenerator::new(self.config.scenarios).generate(&forecast.values());
        let risk_metrics = RiskMetricsCalculator::new().calculate(history);

        info!(
            months = history.len(),
            horizon = forecast.horizon(),
            seasonal = features.seasonal_pattern().is_some(),
            model = trained.name(),
            "cash flow forecast complete"
        );
        Ok(ForecastReport::new(history, &forecast, &scenarios, risk_metrics))
    }
}
