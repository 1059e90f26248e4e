//! # Cashflow Math
//!
//! Numeric building blocks used by the cash flow forecasting pipeline.
//! Nothing in this crate knows about transactions or months; every function
//! works on plain `f64` series and matrices.
//!
//! - [`rolling`]: trailing-window mean and standard deviation
//! - [`stats`]: guarded summary statistics that report undefined results as `None`
//! - [`decomposition`]: additive classical seasonal decomposition
//! - [`scaling`]: z-score feature standardization
//! - [`tree`] and [`forest`]: CART regression trees and a bagged random forest

use thiserror::Error;

pub mod decomposition;
pub mod forest;
pub mod rolling;
pub mod scaling;
pub mod stats;
pub mod tree;

pub use decomposition::{decompose_additive, Decomposition};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use rolling::{rolling_mean, rolling_std, RollingWindow};
pub use scaling::{FittedScaler, StandardScaler};
pub use tree::{RegressionTree, TreeConfig};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
