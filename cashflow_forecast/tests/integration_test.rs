use cashflow_forecast::{
    CashflowForecaster, ForecastConfig, ForecastError, GapPolicy, Transaction, TransactionLoader,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

// Two years of salary/rent/spending with a December spending spike
fn create_transactions_csv(months: u32) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,description,inflow,outflow").unwrap();
    for i in 0..months {
        let year = 2022 + (i / 12);
        let month = i % 12 + 1;
        let spending = if month == 12 { 2500.0 } else { 1300.0 + (i % 5) as f64 * 45.0 };
        writeln!(file, "{}-{:02}-01,salary,{:.2},0", year, month, 4800.0 + i as f64 * 12.5).unwrap();
        writeln!(file, "{}-{:02}-04,rent,0,1750", year, month).unwrap();
        writeln!(file, "{}-{:02}-18,card,35.5,{:.2}", year, month, spending).unwrap();
    }
    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Sample data
    let file = create_transactions_csv(24);

    // 2. Load
    let transactions = TransactionLoader::from_csv(file.path()).unwrap();
    assert_eq!(transactions.len(), 72);

    // 3. Forecast
    let forecaster = CashflowForecaster::new(ForecastConfig::default()).unwrap();
    let report = forecaster.forecast_transactions(&transactions).unwrap();

    assert_eq!(report.historical_data.len(), 24);
    assert_eq!(report.forecast_data.len(), 12);
    assert_eq!(report.forecast_data[0].month.label(), "2024-01");
    assert_eq!(report.forecast_data[11].month.label(), "2024-12");

    for record in &report.forecast_data {
        assert!((record.optimistic - record.baseline * 1.2).abs() < 1e-9);
        assert!((record.severe_stress - record.baseline * 0.6).abs() < 1e-9);
    }
    assert_eq!(report.risk_metrics.negative_months_ratio, Some(0.0));
    assert!(report.risk_metrics.average_monthly_coverage.unwrap() > 1.0);
}

#[test]
fn test_csv_entry_point_matches_transactions() {
    let file = create_transactions_csv(18);
    let forecaster = CashflowForecaster::new(ForecastConfig::default().with_horizon(3)).unwrap();

    let from_file = forecaster.forecast_csv(file.path()).unwrap();
    let transactions = TransactionLoader::from_csv(file.path()).unwrap();
    let from_records = forecaster.forecast_transactions(&transactions).unwrap();

    assert_eq!(from_file, from_records);
    assert_eq!(from_file.forecast_data.len(), 3);
}

#[test]
fn test_json_report_layout() {
    let file = create_transactions_csv(16);
    let forecaster = CashflowForecaster::new(ForecastConfig::default()).unwrap();
    let report = forecaster.forecast_csv(file.path()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["historical_data"].as_array().unwrap().len(), 16);
    assert_eq!(json["historical_data"][0]["month"], "2022-01");
    assert!(json["historical_data"][0]["net_cashflow"].is_number());
    assert_eq!(json["forecast_data"].as_array().unwrap().len(), 12);
    for key in ["month", "baseline", "optimistic", "pessimistic", "severe_stress"] {
        assert!(json["forecast_data"][0].get(key).is_some(), "missing {}", key);
    }
    for key in [
        "operating_cash_flow_ratio",
        "cash_flow_volatility",
        "negative_months_ratio",
        "trend_strength",
        "average_monthly_coverage",
    ] {
        assert!(json["risk_metrics"].get(key).is_some(), "missing {}", key);
    }

    let pretty = report.to_json_pretty().unwrap();
    assert!(pretty.contains('\n'));
}

#[test]
fn test_forecast_csv_output() {
    let file = create_transactions_csv(20);
    let forecaster = CashflowForecaster::new(ForecastConfig::default().with_horizon(2)).unwrap();
    let report = forecaster.forecast_csv(file.path()).unwrap();

    let mut buffer = Vec::new();
    report.write_forecast_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "month,baseline,optimistic,pessimistic,severe_stress");
    assert!(lines[1].starts_with("2023-09,"));
    assert!(lines[2].starts_with("2023-10,"));
}

#[test]
fn test_gap_months_are_zero_filled_in_report() {
    let transactions: Vec<Transaction> = (0..16)
        .filter(|i| i % 5 != 3)
        .map(|i| {
            let date = format!("{}-{:02}-10", 2022 + i / 12, i % 12 + 1);
            Transaction::parse(&date, 3000.0, 2500.0).unwrap()
        })
        .collect();

    let zero_fill = CashflowForecaster::new(ForecastConfig::default()).unwrap();
    let report = zero_fill.forecast_transactions(&transactions).unwrap();
    assert_eq!(report.historical_data.len(), 16);
    assert_eq!(report.historical_data[3].net, 0.0);

    // 13 months remain, too few for the 12-month window
    let mut config = ForecastConfig {
        gap_policy: GapPolicy::Skip,
        ..ForecastConfig::default()
    };
    config.features.windows = vec![3, 6];
    let skip = CashflowForecaster::new(config).unwrap();
    let report = skip.forecast_transactions(&transactions).unwrap();
    assert_eq!(report.historical_data.len(), 13);
}

#[test]
fn test_short_history_is_rejected() {
    let file = create_transactions_csv(6);
    let forecaster = CashflowForecaster::new(ForecastConfig::default()).unwrap();

    let result = forecaster.forecast_csv(file.path());
    assert!(matches!(result, Err(ForecastError::InsufficientDataError(_))));
}

#[test]
fn test_single_month_is_rejected() {
    let bytes = b"date,inflow,outflow\n2024-01-01,100,50\n2024-01-15,20,10\n";
    let transactions = TransactionLoader::from_csv_bytes(bytes).unwrap();
    let forecaster = CashflowForecaster::new(ForecastConfig::default()).unwrap();

    let result = forecaster.forecast_transactions(&transactions);
    assert!(matches!(result, Err(ForecastError::InsufficientDataError(_))));
}

#[test]
fn test_invalid_config_rejected_up_front() {
    let result = CashflowForecaster::new(ForecastConfig::default().with_horizon(0));
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}
