//! Transaction records and table loading

use crate::error::{ForecastError, Result};
use crate::utils::parse_date;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Required column holding the transaction date
pub const DATE_COLUMN: &str = "date";
/// Required column holding money received
pub const INFLOW_COLUMN: &str = "inflow";
/// Required column holding money paid out
pub const OUTFLOW_COLUMN: &str = "outflow";

/// A single dated bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    date: NaiveDate,
    inflow: f64,
    outflow: f64,
}

impl Transaction {
    /// Create a transaction; amounts must be finite and non-negative
    pub fn new(date: NaiveDate, inflow: f64, outflow: f64) -> Result<Self> {
        for (name, value) in [(INFLOW_COLUMN, inflow), (OUTFLOW_COLUMN, outflow)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::SchemaError(format!(
                    "{} must be a finite non-negative amount, got {} on {}",
                    name, value, date
                )));
            }
        }
        Ok(Self {
            date,
            inflow,
            outflow,
        })
    }

    /// Create a transaction from a `YYYY-MM-DD` style date string
    pub fn parse(date: &str, inflow: f64, outflow: f64) -> Result<Self> {
        Self::new(parse_date(date)?, inflow, outflow)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn inflow(&self) -> f64 {
        self.inflow
    }

    pub fn outflow(&self) -> f64 {
        self.outflow
    }

    /// Inflow minus outflow
    pub fn net(&self) -> f64 {
        self.inflow - self.outflow
    }
}

/// Unvalidated wire form of [`Transaction`]
#[derive(Deserialize)]
struct RawTransaction {
    date: NaiveDate,
    inflow: f64,
    outflow: f64,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = ForecastError;

    fn try_from(raw: RawTransaction) -> Result<Self> {
        Transaction::new(raw.date, raw.inflow, raw.outflow)
    }
}

/// Loader turning transaction tables into [`Transaction`] records
#[derive(Debug)]
pub struct TransactionLoader;

impl TransactionLoader {
    /// Load transactions from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Load transactions from the raw bytes of an uploaded CSV file
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Vec<Transaction>> {
        let df = CsvReader::new(Cursor::new(bytes.to_vec()))
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract transactions from a DataFrame with `date`, `inflow` and
    /// `outflow` columns (matched case-insensitively). Extra columns are ignored.
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<Transaction>> {
        if df.height() == 0 {
            return Err(ForecastError::SchemaError(
                "Transaction table has no rows".to_string(),
            ));
        }
        let date_column = Self::find_column(df, DATE_COLUMN)?;
        let inflow_column = Self::find_column(df, INFLOW_COLUMN)?;
        let outflow_column = Self::find_column(df, OUTFLOW_COLUMN)?;

        let dates = Self::column_as_dates(df.column(&date_column)?)?;
        let inflows = Self::column_as_amounts(df.column(&inflow_column)?)?;
        let outflows = Self::column_as_amounts(df.column(&outflow_column)?)?;

        let transactions = dates
            .into_iter()
            .zip(inflows)
            .zip(outflows)
            .map(|((date, inflow), outflow)| Transaction::new(date, inflow, outflow))
            .collect::<Result<Vec<_>>>()?;

        debug!(rows = transactions.len(), "loaded transaction table");
        Ok(transactions)
    }

    /// Find a required column by name, ignoring case and surrounding whitespace
    fn find_column(df: &DataFrame, required: &str) -> Result<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| name.trim().eq_ignore_ascii_case(required))
            .map(|name| name.to_string())
            .ok_or_else(|| {
                ForecastError::SchemaError(format!("Missing required column '{}'", required))
            })
    }

    fn column_as_dates(col: &Series) -> Result<Vec<NaiveDate>> {
        let text = match col.dtype() {
            DataType::Utf8 => col.clone(),
            DataType::Date | DataType::Datetime(_, _) => col.cast(&DataType::Utf8)?,
            other => {
                return Err(ForecastError::SchemaError(format!(
                    "Column '{}' has type {} and cannot hold dates",
                    col.name(),
                    other
                )))
            }
        };

        text.utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(raw) => parse_date(raw),
                None => Err(ForecastError::SchemaError(format!(
                    "Missing date in row {}",
                    row + 1
                ))),
            })
            .collect()
    }

    /// Amounts as f64. Nulls count as zero; text must parse as a number.
    fn column_as_amounts(col: &Series) -> Result<Vec<f64>> {
        match col.dtype() {
            dtype if dtype.is_numeric() => Ok(col
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|value| value.unwrap_or(0.0))
                .collect()),
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value.map(str::trim) {
                    None | Some("") => Ok(0.0),
                    Some(raw) => parse_amount(raw).ok_or_else(|| {
                        ForecastError::SchemaError(format!(
                            "Non-numeric value '{}' in column '{}' row {}",
                            raw,
                            col.name(),
                            row + 1
                        ))
                    }),
                })
                .collect(),
            DataType::Null => Ok(vec![0.0; col.len()]),
            other => Err(ForecastError::SchemaError(format!(
                "Column '{}' has type {} and cannot hold amounts",
                col.name(),
                other
            ))),
        }
    }
}

/// Parse an amount cell. Commas are accepted only as thousands separators
/// (`1,234,567.89`); a decimal comma such as `1,5` is rejected.
fn parse_amount(raw: &str) -> Option<f64> {
    if !raw.contains(',') {
        return raw.parse().ok();
    }

    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw, None),
    };
    let digits = integer.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(integer);
    let mut groups = digits.split(',');
    let leading = groups.next()?;
    let leading_ok = (1..=3).contains(&leading.len()) && leading.bytes().all(|b| b.is_ascii_digit());
    let rest_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
    let fraction_ok = fraction.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    if !(leading_ok && rest_ok && fraction_ok) {
        return None;
    }

    raw.replace(',', "").parse().ok()
}
