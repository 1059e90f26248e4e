//! Risk ratios over the monthly history

use crate::aggregate::MonthlyHistory;
use cashflow_math::stats::{mean, pearson, safe_div, sample_std};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Summary ratios for lending risk. `None` marks a ratio whose denominator
/// was zero; it serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// mean(net) / mean(outflow)
    pub operating_cash_flow_ratio: Option<f64>,
    /// std(net) / mean(net)
    pub cash_flow_volatility: Option<f64>,
    /// Share of months with negative net cash flow
    pub negative_months_ratio: Option<f64>,
    /// Pearson correlation between month index and net cash flow
    pub trend_strength: Option<f64>,
    /// mean(inflow) / mean(outflow)
    pub average_monthly_coverage: Option<f64>,
}

impl RiskMetrics {
    /// `(name, value)` pairs in field order
    pub fn entries(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("operating_cash_flow_ratio", self.operating_cash_flow_ratio),
            ("cash_flow_volatility", self.cash_flow_volatility),
            ("negative_months_ratio", self.negative_months_ratio),
            ("trend_strength", self.trend_strength),
            ("average_monthly_coverage", self.average_monthly_coverage),
        ]
    }
}

impl fmt::Display for RiskMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk Metrics:")?;
        for (name, value) in self.entries() {
            match value {
                Some(v) => writeln!(f, "  {:<26} {:.4}", name, v)?,
                None => writeln!(f, "  {:<26} undefined", name)?,
            }
        }
        Ok(())
    }
}

/// Computes [`RiskMetrics`] over a monthly history
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskMetricsCalculator;

impl RiskMetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute every ratio; zero denominators yield `None` rather than an error
    pub fn calculate(&self, history: &MonthlyHistory) -> RiskMetrics {
        let inflow = history.inflows();
        let outflow = history.outflows();
        let net = history.nets();

        let mean_inflow = mean(&inflow);
        let mean_outflow = mean(&outflow);
        let mean_net = mean(&net);

        let ratio = |numerator: Option<f64>, denominator: Option<f64>| match (numerator, denominator) {
            (Some(n), Some(d)) => safe_div(n, d),
            _ => None,
        };

        let negative_months = net.iter().filter(|&&v| v < 0.0).count();
        let month_index: Vec<f64> = (0..net.len()).map(|i| i as f64).collect();

        let metrics = RiskMetrics {
            operating_cash_flow_ratio: ratio(mean_net, mean_outflow),
            cash_flow_volatility: ratio(sample_std(&net), mean_net),
            negative_months_ratio: safe_div(negative_months as f64, net.len() as f64),
            trend_strength: pearson(&month_index, &net),
            average_monthly_coverage: ratio(mean_inflow, mean_outflow),
        };

        for (name, value) in metrics.entries() {
            if value.is_none() {
                warn!(metric = name, "risk metric undefined for this history");
            }
        }
        metrics
    }
}
