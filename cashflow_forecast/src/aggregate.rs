//! Monthly aggregation of transactions

use crate::config::GapPolicy;
use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use crate::utils::MonthKey;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Fewest months a history may hold
pub const MIN_MONTHS: usize = 2;

/// Summed cash flows of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub inflow: f64,
    pub outflow: f64,
    #[serde(rename = "net_cashflow")]
    pub net: f64,
}

impl MonthlyAggregate {
    /// Build a month from its sums; `net` is derived
    pub fn new(month: MonthKey, inflow: f64, outflow: f64) -> Self {
        Self {
            month,
            inflow,
            outflow,
            net: inflow - outflow,
        }
    }

    fn empty(month: MonthKey) -> Self {
        Self::new(month, 0.0, 0.0)
    }
}

/// Months in strictly ascending order, at least [`MIN_MONTHS`] of them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlyHistory {
    months: Vec<MonthlyAggregate>,
}

impl MonthlyHistory {
    /// Wrap pre-built aggregates, checking ordering and length
    pub fn from_aggregates(months: Vec<MonthlyAggregate>) -> Result<Self> {
        if months.len() < MIN_MONTHS {
            return Err(ForecastError::InsufficientDataError(format!(
                "At least {} months of history are required, got {}",
                MIN_MONTHS,
                months.len()
            )));
        }
        if let Some(pair) = months.windows(2).find(|pair| pair[0].month >= pair[1].month) {
            return Err(ForecastError::SchemaError(format!(
                "Months must be unique and ascending: {} is followed by {}",
                pair[0].month, pair[1].month
            )));
        }
        Ok(Self { months })
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[MonthlyAggregate] {
        &self.months
    }

    /// The most recent month
    pub fn last_month(&self) -> MonthKey {
        // Never empty: construction requires MIN_MONTHS entries.
        self.months[self.months.len() - 1].month
    }

    pub fn inflows(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.inflow).collect()
    }

    pub fn outflows(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.outflow).collect()
    }

    pub fn nets(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.net).collect()
    }
}

/// Collapses transactions into one row per calendar month
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    gap_policy: GapPolicy,
}

impl Aggregator {
    pub fn new(gap_policy: GapPolicy) -> Self {
        Self { gap_policy }
    }

    /// Group transactions by calendar month and sum inflow, outflow and net.
    ///
    /// Input order does not matter. Fails with `InsufficientDataError` when
    /// fewer than two months result.
    pub fn aggregate(&self, transactions: &[Transaction]) -> Result<MonthlyHistory> {
        let mut sums: BTreeMap<MonthKey, MonthlyAggregate> = BTreeMap::new();
        for transaction in transactions {
            let month = MonthKey::from_date(transaction.date());
            let entry = sums
                .entry(month)
                .or_insert_with(|| MonthlyAggregate::empty(month));
            entry.inflow += transaction.inflow();
            entry.outflow += transaction.outflow();
        }

        let mut months: Vec<MonthlyAggregate> = sums
            .into_values()
            .map(|m| MonthlyAggregate::new(m.month, m.inflow, m.outflow))
            .collect();
        if self.gap_policy == GapPolicy::ZeroFill {
            months = Self::fill_gaps(months);
        }

        debug!(
            transactions = transactions.len(),
            months = months.len(),
            "aggregated transactions by month"
        );
        MonthlyHistory::from_aggregates(months)
    }

    fn fill_gaps(months: Vec<MonthlyAggregate>) -> Vec<MonthlyAggregate> {
        let (first, last) = match (months.first(), months.last()) {
            (Some(first), Some(last)) => (first.month, last.month),
            _ => return months,
        };
        let span = first.months_until(&last) as usize + 1;
        if span == months.len() {
            return months;
        }

        warn!(
            filled = span - months.len(),
            "months without transactions filled with zeros"
        );
        let mut filled = Vec::with_capacity(span);
        let mut expected = first;
        for aggregate in months {
            while expected < aggregate.month {
                filled.push(MonthlyAggregate::empty(expected));
                expected = expected.succ();
            }
            filled.push(aggregate);
            expected = aggregate.month.succ();
        }
        filled
    }
}
