//! # Cashflow Workspace
//!
//! `cashflow_workspace` ties the workspace crates together:
//!
//! - [`math`] (`cashflow_math`): rolling statistics, seasonal decomposition,
//!   feature scaling and the seeded regression tree ensemble
//! - [`forecast`] (`cashflow_forecast`): transaction loading, monthly
//!   aggregation, the forecasting pipeline, scenarios and risk metrics
//!
//! ## Example
//!
//! ```
//! use cashflow_workspace::{forecast_transactions, Transaction};
//!
//! let transactions: Vec<Transaction> = (0..18)
//!     .map(|i| {
//!         let date = format!("{}-{:02}-15", 2023 + i / 12, i % 12 + 1);
//!         Transaction::parse(&date, 4000.0 + i as f64 * 10.0, 3100.0).unwrap()
//!     })
//!     .collect();
//!
//! let report = forecast_transactions(&transactions, 6).unwrap();
//! assert_eq!(report.forecast_data.len(), 6);
//! assert_eq!(report.forecast_data[0].month.label(), "2024-07");
//! ```

use std::path::Path;

pub use cashflow_forecast as forecast;
pub use cashflow_math as math;

pub use cashflow_forecast::{
    CashflowForecaster, ForecastConfig, ForecastError, ForecastReport, MonthKey, Result,
    RiskMetrics, ScenarioSet, Transaction,
};

/// Forecasts `horizon` months from a transaction CSV with the default configuration.
///
/// # Examples
///
/// ```no_run
/// let report = cashflow_workspace::forecast_csv("transactions.csv", 12)?;
/// println!("{}", report.to_json_pretty()?);
/// # Ok::<(), cashflow_workspace::ForecastError>(())
/// ```
pub fn forecast_csv<P: AsRef<Path>>(path: P, horizon: usize) -> Result<ForecastReport> {
    CashflowForecaster::new(ForecastConfig::default().with_horizon(horizon))?.forecast_csv(path)
}

/// Forecasts `horizon` months from in-memory transactions with the default configuration.
pub fn forecast_transactions(transactions: &[Transaction], horizon: usize) -> Result<ForecastReport> {
    CashflowForecaster::new(ForecastConfig::default().with_horizon(horizon))?
        .forecast_transactions(transactions)
}
