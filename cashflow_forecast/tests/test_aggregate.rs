use cashflow_forecast::aggregate::{Aggregator, MonthlyAggregate, MonthlyHistory};
use cashflow_forecast::{ForecastError, GapPolicy, MonthKey, Transaction};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn tx(date: &str, inflow: f64, outflow: f64) -> Transaction {
    Transaction::parse(date, inflow, outflow).unwrap()
}

fn month(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}

#[test]
fn test_same_month_transactions_are_summed() {
    let transactions = vec![
        tx("2024-01-03", 100.0, 10.0),
        tx("2024-01-28", 50.0, 20.0),
        tx("2024-02-10", 80.0, 90.0),
    ];

    let history = Aggregator::default().aggregate(&transactions).unwrap();
    assert_eq!(history.len(), 2);

    let january = history.months()[0];
    assert_eq!(january.month, month(2024, 1));
    assert_eq!(january.inflow, 150.0);
    assert_eq!(january.outflow, 30.0);
    assert_eq!(january.net, 120.0);

    let february = history.months()[1];
    assert_eq!(february.net, -10.0);
}

#[test]
fn test_input_order_does_not_matter() {
    let ordered = vec![
        tx("2023-11-02", 10.0, 1.0),
        tx("2023-12-02", 20.0, 2.0),
        tx("2024-01-02", 30.0, 3.0),
    ];
    let shuffled = vec![ordered[2], ordered[0], ordered[1]];

    let a = Aggregator::default().aggregate(&ordered).unwrap();
    let b = Aggregator::default().aggregate(&shuffled).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        b.months().iter().map(|m| m.month).collect::<Vec<_>>(),
        vec![month(2023, 11), month(2023, 12), month(2024, 1)]
    );
}

#[test]
fn test_net_equals_inflow_minus_outflow() {
    let transactions: Vec<Transaction> = (1..=9)
        .map(|m| tx(&format!("2024-{:02}-15", m), 1000.0 / m as f64, 37.5 * m as f64))
        .collect();

    let history = Aggregator::default().aggregate(&transactions).unwrap();
    for aggregate in history.months() {
        assert_eq!(aggregate.net, aggregate.inflow - aggregate.outflow);
    }
}

#[rstest]
#[case(GapPolicy::ZeroFill, 4)]
#[case(GapPolicy::Skip, 2)]
fn test_gap_policy(#[case] policy: GapPolicy, #[case] expected_months: usize) {
    let transactions = vec![tx("2024-01-10", 100.0, 40.0), tx("2024-04-10", 60.0, 10.0)];

    let history = Aggregator::new(policy).aggregate(&transactions).unwrap();
    assert_eq!(history.len(), expected_months);
    assert_eq!(history.last_month(), month(2024, 4));

    if policy == GapPolicy::ZeroFill {
        assert_eq!(history.months()[1], MonthlyAggregate::new(month(2024, 2), 0.0, 0.0));
        assert_eq!(history.months()[2].net, 0.0);
    }
}

#[test]
fn test_gap_fill_across_year_boundary() {
    let transactions = vec![tx("2023-11-01", 5.0, 0.0), tx("2024-02-01", 5.0, 0.0)];

    let history = Aggregator::new(GapPolicy::ZeroFill)
        .aggregate(&transactions)
        .unwrap();
    let months: Vec<String> = history.months().iter().map(|m| m.month.label()).collect();
    assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
}

#[rstest]
#[case(vec![])]
#[case(vec![tx("2024-01-01", 1.0, 0.0)])]
#[case(vec![tx("2024-01-01", 1.0, 0.0), tx("2024-01-31", 2.0, 0.0)])]
fn test_fewer_than_two_months_is_insufficient(#[case] transactions: Vec<Transaction>) {
    let result = Aggregator::default().aggregate(&transactions);
    assert!(matches!(result, Err(ForecastError::InsufficientDataError(_))));
}

#[test]
fn test_history_rejects_unordered_months() {
    let result = MonthlyHistory::from_aggregates(vec![
        MonthlyAggregate::new(month(2024, 2), 1.0, 0.0),
        MonthlyAggregate::new(month(2024, 1), 1.0, 0.0),
    ]);
    assert!(matches!(result, Err(ForecastError::SchemaError(_))));
}

#[test]
fn test_history_serializes_net_cashflow() {
    let history = MonthlyHistory::from_aggregates(vec![
        MonthlyAggregate::new(month(2024, 1), 150.0, 30.0),
        MonthlyAggregate::new(month(2024, 2), 0.0, 0.0),
    ])
    .unwrap();

    let json = serde_json::to_value(&history).unwrap();
    assert_eq!(
        json[0],
        serde_json::json!({
            "month": "2024-01",
            "inflow": 150.0,
            "outflow": 30.0,
            "net_cashflow": 120.0
        })
    );
}
