use approx::assert_relative_eq;
use cashflow_forecast::aggregate::{MonthlyAggregate, MonthlyHistory};
use cashflow_forecast::metrics::{RiskMetrics, RiskMetricsCalculator};
use cashflow_forecast::MonthKey;
use pretty_assertions::assert_eq;

fn history_from(flows: &[(f64, f64)]) -> MonthlyHistory {
    let mut month = MonthKey::new(2024, 1).unwrap();
    let mut months = Vec::new();
    for &(inflow, outflow) in flows {
        months.push(MonthlyAggregate::new(month, inflow, outflow));
        month = month.succ();
    }
    MonthlyHistory::from_aggregates(months).unwrap()
}

#[test]
fn test_known_values() {
    // nets: 100, -50, 200, -20
    let history = history_from(&[(300.0, 200.0), (100.0, 150.0), (400.0, 200.0), (180.0, 200.0)]);
    let metrics = RiskMetricsCalculator::new().calculate(&history);

    assert_relative_eq!(metrics.operating_cash_flow_ratio.unwrap(), 57.5 / 187.5, epsilon = 1e-12);
    assert_relative_eq!(metrics.average_monthly_coverage.unwrap(), 245.0 / 187.5, epsilon = 1e-12);
    assert_relative_eq!(metrics.negative_months_ratio.unwrap(), 0.5);
    // sample std of the nets is 115
    assert_relative_eq!(metrics.cash_flow_volatility.unwrap(), 2.0, epsilon = 1e-12);
    let expected_trend = -55.0 / (5.0f64 * 39675.0).sqrt();
    assert_relative_eq!(metrics.trend_strength.unwrap(), expected_trend, epsilon = 1e-12);
}

#[test]
fn test_negative_months_ratio_bounds() {
    let all_positive = history_from(&[(10.0, 1.0), (10.0, 2.0), (10.0, 3.0)]);
    let all_negative = history_from(&[(1.0, 10.0), (2.0, 10.0), (3.0, 10.0)]);

    let calculator = RiskMetricsCalculator::new();
    assert_eq!(calculator.calculate(&all_positive).negative_months_ratio, Some(0.0));
    assert_eq!(calculator.calculate(&all_negative).negative_months_ratio, Some(1.0));
}

#[test]
fn test_zero_outflow_gives_undefined_ratios() {
    let history = history_from(&[(100.0, 0.0), (200.0, 0.0), (300.0, 0.0)]);
    let metrics = RiskMetricsCalculator::new().calculate(&history);

    assert_eq!(metrics.operating_cash_flow_ratio, None);
    assert_eq!(metrics.average_monthly_coverage, None);
    assert!(metrics.cash_flow_volatility.is_some());
    assert_relative_eq!(metrics.trend_strength.unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_zero_mean_net_and_flat_series() {
    // nets cancel out to a zero mean; a flat net series has no trend
    let cancelling = history_from(&[(100.0, 0.0), (0.0, 100.0)]);
    let flat = history_from(&[(50.0, 20.0), (50.0, 20.0), (50.0, 20.0)]);

    let calculator = RiskMetricsCalculator::new();
    assert_eq!(calculator.calculate(&cancelling).cash_flow_volatility, None);
    assert_eq!(calculator.calculate(&flat).trend_strength, None);
}

#[test]
fn test_undefined_metrics_serialize_as_null() {
    let metrics = RiskMetrics {
        operating_cash_flow_ratio: None,
        cash_flow_volatility: Some(0.25),
        negative_months_ratio: Some(0.0),
        trend_strength: None,
        average_monthly_coverage: None,
    };

    let json = serde_json::to_value(metrics).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "operating_cash_flow_ratio": null,
            "cash_flow_volatility": 0.25,
            "negative_months_ratio": 0.0,
            "trend_strength": null,
            "average_monthly_coverage": null
        })
    );
    assert!(metrics.to_string().contains("undefined"));
}
