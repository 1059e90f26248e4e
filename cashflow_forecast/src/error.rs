//! Error types for the cashflow_forecast crate

use cashflow_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the cashflow_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or malformed input columns, unparsable dates, bad amounts
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Too few months to aggregate, warm up features or train
    #[error("Insufficient data: {0}")]
    InsufficientDataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised by the numeric core while fitting or predicting
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error loading configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error serializing a report
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientDataError(msg),
            MathError::InvalidInput(msg) | MathError::CalculationError(msg) => {
                ForecastError::ModelError(msg)
            }
        }
    }
}

impl From<config::ConfigError> for ForecastError {
    fn from(err: config::ConfigError) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}
