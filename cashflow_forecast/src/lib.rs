//! # Cashflow Forecast
//!
//! Monthly net cash flow forecasting from bank transactions, for lending risk
//! assessment.
//!
//! ## Pipeline
//!
//! - **Aggregation**: transactions are summed per calendar month ([`aggregate`])
//! - **Features**: trailing means and standard deviations over 3, 6 and 12
//!   months, plus a seasonal component once a full year of history exists ([`features`])
//! - **Forecasting**: a seeded random forest trained on standardized features,
//!   projected month by month with self-updating net means ([`models`])
//! - **Scenarios**: baseline, optimistic, pessimistic and severe stress
//!   variants ([`scenarios`])
//! - **Risk metrics**: coverage, volatility and trend ratios over the history ([`metrics`])
//!
//! Each run is stateless: the trained model is an immutable value created and
//! dropped within the call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cashflow_forecast::{CashflowForecaster, ForecastConfig};
//!
//! let forecaster = CashflowForecaster::new(ForecastConfig::default())?;
//! let report = forecaster.forecast_csv("transactions.csv")?;
//!
//! for record in &report.forecast_data {
//!     println!("{} baseline={:.2} stress={:.2}", record.month, record.baseline, record.severe_stress);
//! }
//! println!("{}", report.risk_metrics);
//! # Ok::<(), cashflow_forecast::ForecastError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod report;
pub mod scenarios;
pub mod utils;

// Re-export commonly used types
pub use crate::aggregate::{Aggregator, MonthlyAggregate, MonthlyHistory};
pub use crate::config::{ForecastConfig, GapPolicy, UpdateRule};
pub use crate::data::{Transaction, TransactionLoader};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureSet, SeasonalPattern};
pub use crate::metrics::{RiskMetrics, RiskMetricsCalculator};
pub use crate::models::{CashflowModel, ForecastResult, TrainedCashflowModel};
pub use crate::report::{CashflowForecaster, ForecastRecord, ForecastReport};
pub use crate::scenarios::{ScenarioGenerator, ScenarioSet};
pub use crate::utils::MonthKey;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
