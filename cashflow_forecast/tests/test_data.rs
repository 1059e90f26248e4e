use cashflow_forecast::data::{Transaction, TransactionLoader};
use cashflow_forecast::ForecastError;
use chrono::NaiveDate;
use polars::prelude::*;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_load_csv_file() {
    let file = write_csv(
        "date,inflow,outflow\n\
         2024-01-05,1000.0,200.0\n\
         2024-01-20,500.0,0.0\n\
         2024-02-03,0.0,750.5\n",
    );

    let transactions = TransactionLoader::from_csv(file.path()).unwrap();
    assert_eq!(transactions.len(), 3);
    assert_eq!(
        transactions[0].date(),
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    );
    assert_eq!(transactions[1].inflow(), 500.0);
    assert_eq!(transactions[2].outflow(), 750.5);
    assert_eq!(transactions[0].net(), 800.0);
}

#[test]
fn test_load_csv_bytes_with_extra_columns_and_mixed_case() {
    let bytes = b"Date,Description,Inflow,Outflow\n\
                  2024-03-01,salary,3000,0\n\
                  2024-03-15,rent,0,1200\n";

    let transactions = TransactionLoader::from_csv_bytes(bytes).unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].inflow(), 3000.0);
    assert_eq!(transactions[1].outflow(), 1200.0);
}

#[test]
fn test_empty_amount_counts_as_zero() {
    let bytes = b"date,inflow,outflow\n2024-03-01,,40\n2024-04-01,10,\n";

    let transactions = TransactionLoader::from_csv_bytes(bytes).unwrap();
    assert_eq!(transactions[0].inflow(), 0.0);
    assert_eq!(transactions[0].outflow(), 40.0);
    assert_eq!(transactions[1].outflow(), 0.0);
}

#[rstest]
#[case("date,inflow\n2024-01-01,10\n", "outflow")]
#[case("inflow,outflow\n10,5\n", "date")]
#[case("date,outflow\n2024-01-01,10\n", "inflow")]
fn test_missing_column_is_schema_error(#[case] csv: &str, #[case] missing: &str) {
    let result = TransactionLoader::from_csv_bytes(csv.as_bytes());
    match result {
        Err(ForecastError::SchemaError(msg)) => assert!(msg.contains(missing)),
        other => panic!("Expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_bad_date_is_schema_error() {
    let bytes = b"date,inflow,outflow\nnot-a-date,10,5\n";
    let result = TransactionLoader::from_csv_bytes(bytes);
    assert!(matches!(result, Err(ForecastError::SchemaError(_))));
}

#[test]
fn test_non_numeric_amount_is_schema_error() {
    let bytes = b"date,inflow,outflow\n2024-01-01,ten,5\n2024-02-01,20,5\n";
    let result = TransactionLoader::from_csv_bytes(bytes);
    match result {
        Err(ForecastError::SchemaError(msg)) => assert!(msg.contains("ten")),
        other => panic!("Expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_negative_amount_is_schema_error() {
    let bytes = b"date,inflow,outflow\n2024-01-01,-10,5\n";
    let result = TransactionLoader::from_csv_bytes(bytes);
    assert!(matches!(result, Err(ForecastError::SchemaError(_))));

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert!(Transaction::new(date, 10.0, -1.0).is_err());
    assert!(Transaction::new(date, f64::NAN, 0.0).is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = TransactionLoader::from_csv("/nonexistent/transactions.csv");
    assert!(result.is_err());
}

#[test]
fn test_from_dataframe() {
    let df = df! {
        "date" => &["2024-01-10", "2024-02-10"],
        "inflow" => &[100.0, 200.0],
        "outflow" => &[50.0, 25.0],
    }
    .unwrap();

    let transactions = TransactionLoader::from_dataframe(&df).unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[1].net(), 175.0);
}

#[test]
fn test_from_dataframe_integer_amounts() {
    let df = df! {
        "date" => &["2024-01-10", "2024-02-10"],
        "inflow" => &[100i64, 200],
        "outflow" => &[50i64, 25],
    }
    .unwrap();

    let transactions = TransactionLoader::from_dataframe(&df).unwrap();
    assert_eq!(transactions[0].inflow(), 100.0);
    assert_eq!(transactions[1].outflow(), 25.0);
}

#[test]
fn test_transaction_parse_accepts_common_layouts() {
    let expected = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
    for raw in ["2024-05-17", "2024/05/17", "05/17/2024"] {
        let transaction = Transaction::parse(raw, 1.0, 0.0).unwrap();
        assert_eq!(transaction.date(), expected, "layout {}", raw);
    }
}

#[test]
fn test_header_only_csv_is_schema_error() {
    let result = TransactionLoader::from_csv_bytes(b"date,inflow,outflow\n");
    match result {
        Err(ForecastError::SchemaError(msg)) => assert!(msg.contains("no rows")),
        other => panic!("Expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_thousands_separators_accepted_decimal_comma_rejected() {
    let bytes = b"date,inflow,outflow\n2024-01-01,\"1,234.50\",0\n2024-02-01,500,\"12,000\"\n";
    let transactions = TransactionLoader::from_csv_bytes(bytes).unwrap();
    assert_eq!(transactions[0].inflow(), 1234.5);
    assert_eq!(transactions[1].outflow(), 12000.0);

    let bytes = b"date,inflow,outflow\n2024-01-01,\"1,5\",0\n2024-02-01,2,0\n";
    let result = TransactionLoader::from_csv_bytes(bytes);
    match result {
        Err(ForecastError::SchemaError(msg)) => assert!(msg.contains("1,5")),
        other => panic!("Expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_deserialize_validates_amounts() {
    let valid: Transaction =
        serde_json::from_str(r#"{"date":"2024-01-01","inflow":100.0,"outflow":5.0}"#).unwrap();
    assert_eq!(valid.net(), 95.0);

    let negative =
        serde_json::from_str::<Transaction>(r#"{"date":"2024-01-01","inflow":-100.0,"outflow":5.0}"#);
    assert!(negative.is_err());

    let negative_outflow =
        serde_json::from_str::<Transaction>(r#"{"date":"2024-01-01","inflow":0.0,"outflow":-1.0}"#);
    assert!(negative_outflow.is_err());
}
