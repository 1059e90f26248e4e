use cashflow_forecast::models::{CashflowModel, ForestForecaster, TrainedCashflowModel};
use cashflow_forecast::{
    Aggregator, CashflowForecaster, FeatureBuilder, ForecastConfig, GapPolicy, Transaction,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Cashflow Forecast: Basic Forecasting Example");
    println!("============================================\n");

    println!("Creating sample transactions...");
    let transactions = create_sample_transactions()?;
    println!("{} transactions over 30 months\n", transactions.len());

    // Step-by-step pipeline
    let config = ForecastConfig::default();
    let history = Aggregator::new(GapPolicy::ZeroFill).aggregate(&transactions)?;
    let features = FeatureBuilder::new(config.features.clone()).build(&history)?;
    println!(
        "Features: {} columns, {} complete rows, seasonal={}",
        features.columns().len(),
        features.complete_rows(),
        features.seasonal_pattern().is_some()
    );

    let model = ForestForecaster::from_config(&config)?;
    let trained = model.train(&history, &features)?;
    println!("Trained {}\n", trained.name());

    println!("Top feature importances:");
    let mut importances = trained.feature_importances();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, importance) in importances.iter().take(5) {
        println!("  {:<16} {:.3}", name, importance);
    }

    // Whole pipeline in one call
    let forecaster = CashflowForecaster::new(config.with_horizon(6))?;
    let report = forecaster.forecast_transactions(&transactions)?;

    println!("\n6-month forecast:");
    println!(
        "  {:<8} {:>12} {:>12} {:>12} {:>12}",
        "month", "baseline", "optimistic", "pessimistic", "stress"
    );
    for record in &report.forecast_data {
        println!(
            "  {:<8} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            record.month.to_string(),
            record.baseline,
            record.optimistic,
            record.pessimistic,
            record.severe_stress
        );
    }

    println!("\n{}", report.risk_metrics);
    Ok(())
}

// Salary on the 1st, rent on the 5th, and a December spending spike
fn create_sample_transactions() -> Result<Vec<Transaction>, Box<dyn std::error::Error>> {
    let mut transactions = Vec::new();
    for i in 0..30u32 {
        let year = 2022 + (i / 12) as i32;
        let month = i % 12 + 1;
        let wobble = (i as f64 * 0.7).sin() * 150.0;

        let payday = NaiveDate::from_ymd_opt(year, month, 1).ok_or("invalid date")?;
        let rent_day = NaiveDate::from_ymd_opt(year, month, 5).ok_or("invalid date")?;
        let mid_month = NaiveDate::from_ymd_opt(year, month, 15).ok_or("invalid date")?;

        transactions.push(Transaction::new(payday, 5200.0 + i as f64 * 20.0, 0.0)?);
        transactions.push(Transaction::new(rent_day, 0.0, 1800.0)?);

        let spending = if month == 12 { 2600.0 } else { 1400.0 + wobble };
        transactions.push(Transaction::new(mid_month, 120.0, spending)?);
    }
    Ok(transactions)
}
