use std::fs;
use std::path::{Path, PathBuf};

use creditlens_client::commands::customer::{self, CustomerShowOptions};
use creditlens_client::commands::manual;
use creditlens_client::commands::score::{self, ScoreRunOptions};
use creditlens_client::contracts::envelope::failure_from_error;
use creditlens_client::engine::score_table;
use creditlens_client::import::UploadSource;
use creditlens_client::store::BatchStore;
use creditlens_client::table::{Cell, SheetTable};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::{Value, json};
use tempfile::tempdir;

const CANONICAL_CSV: &str = "\
Customer ID,Credit Limit,Utilisation %,Avg Payment Ratio,Min Due Paid Frequency,Merchant Mix Index,Cash Withdrawal %,Recent Spend Change %,DPD Bucket Next Month
C-1,50000,80,40,60,0.8,25,-20,2
C-2,20000,30,90,10,0.2,5,5,0
C-3,15000,60,45,40,0.75,10,-5,1
";

fn write_file(path: &Path, body: &str) {
    let result = fs::write(path, body);
    assert!(result.is_ok());
}

fn fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    write_file(&path, body);
    path
}

fn score_path(path: &Path) -> creditlens_client::ClientResult<creditlens_client::SuccessEnvelope> {
    score::run(Some(path.display().to_string()))
}

fn customer_by_id<'a>(data: &'a Value, id: &str) -> Option<&'a Value> {
    data["customers"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["Customer ID"] == id))
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64();
    assert!(actual.is_some());
    if let Some(number) = actual {
        assert!((number - expected).abs() < 1e-9, "{number} != {expected}");
    }
}

#[test]
fn csv_upload_is_scored_row_by_row() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(dir.path(), "customers.csv", CANONICAL_CSV);

    let result = score_path(&path);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert!(envelope.ok);
        assert_eq!(envelope.command, "score");
        let data = envelope.data;
        assert_eq!(data["sheet_used"], "customers");
        assert_eq!(data["source_used"], "file");
        assert_eq!(data["risk_counts"], json!({"High": 1, "Low": 1, "Medium": 1}));
        assert!(data.get("batch_id").is_none());

        let ids = data["customers"]
            .as_array()
            .map(|rows| rows.iter().map(|row| row["Customer ID"].clone()).collect())
            .unwrap_or_else(Vec::new);
        assert_eq!(ids, vec![json!("C-1"), json!("C-2"), json!("C-3")]);

        let risky = customer_by_id(&data, "C-1");
        assert!(risky.is_some());
        if let Some(row) = risky {
            for flag in [
                "F1_PaymentLow",
                "F2_SpendDrop",
                "F3_HighMerchantRisk",
                "F4_HighUtilisation",
                "F5_PaymentStress",
                "F6_CashWithdrawRisk",
            ] {
                assert_eq!(row[flag], 1, "{flag}");
            }
            assert_eq!(row["Total_Risk_Flags"], 6);
            assert_eq!(row["Risk_Level"], "High");
            assert_close(&row["Payment_Stress_Score"], 36.0);
            assert_close(&row["Behaviour_Risk_Score"], 64.5);
            assert_eq!(row["Payment_Stress_Category"], "High");
            assert_eq!(row["Behaviour_Risk_Category"], "High");
            assert_eq!(
                row["Risk_Reasons_Text"],
                "Low Payment Ratio, Recent Spend Drop, High-Risk Merchant Spending, High Utilisation, Payment Stress, High Cash Withdrawal"
            );
            assert_eq!(row["Delinquent_Flag"], 1);
            assert_eq!(row["Delinquent_NextMonth_Flag"], 1);
            assert_eq!(row["Delinquent_NextMonth_Label"], "Delinquent Next Month");
        }

        let stable = customer_by_id(&data, "C-2");
        assert!(stable.is_some());
        if let Some(row) = stable {
            assert_eq!(row["Total_Risk_Flags"], 0);
            assert_eq!(row["Risk_Level"], "Low");
            assert_eq!(row["Risk_Reasons_Text"], "Stable behaviour");
            assert_close(&row["Payment_Stress_Score"], 1.0);
            assert_close(&row["Behaviour_Risk_Score"], 16.5);
            assert_eq!(row["Delinquent_Flag"], 0);
            assert_eq!(row["Delinquent_NextMonth_Label"], "Not Delinquent Next Month");
        }

        let medium = customer_by_id(&data, "C-3");
        assert!(medium.is_some());
        if let Some(row) = medium {
            assert_eq!(row["Total_Risk_Flags"], 2);
            assert_eq!(row["Risk_Level"], "Medium");
            assert_eq!(
                row["Risk_Reasons_Text"],
                "Low Payment Ratio, High-Risk Merchant Spending"
            );
        }
    }
}

#[test]
fn messy_headers_score_identically_to_canonical_ones() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let messy_body = CANONICAL_CSV.replacen(
        "Customer ID,Credit Limit,Utilisation %,Avg Payment Ratio,",
        "\"  CUSTOMER ID \",credit limit,UTILISATION %,Avg\u{00A0}Payment\u{200B} Ratio,",
        1,
    );
    let canonical = fixture(dir.path(), "customers.csv", CANONICAL_CSV);
    let messy = fixture(dir.path(), "messy.csv", &messy_body);

    let first = score_path(&canonical);
    let second = score_path(&messy);
    assert!(first.is_ok());
    assert!(second.is_ok());
    if let (Ok(left), Ok(right)) = (first, second) {
        assert_eq!(left.data["customers"], right.data["customers"]);
        assert_eq!(left.data["risk_counts"], right.data["risk_counts"]);
    }
}

#[test]
fn scoring_the_same_file_twice_is_idempotent() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(dir.path(), "customers.csv", CANONICAL_CSV);

    let first = score_path(&path);
    let second = score_path(&path);
    assert!(first.is_ok());
    assert!(second.is_ok());
    if let (Ok(left), Ok(right)) = (first, second) {
        assert_eq!(left.data, right.data);
    }
}

#[test]
fn missing_merchant_mix_index_is_a_schema_error() {
    let headers = [
        "Customer ID",
        "Credit Limit",
        "Utilisation %",
        "Avg Payment Ratio",
        "Min Due Paid Frequency",
        "Cash Withdrawal %",
        "Recent Spend Change %",
    ]
    .iter()
    .map(|header| header.to_string())
    .collect::<Vec<String>>();
    let row = vec![
        Cell::Text("C-9".to_string()),
        Cell::Number(1000.0),
        Cell::Number(10.0),
        Cell::Number(80.0),
        Cell::Number(5.0),
        Cell::Number(1.0),
        Cell::Number(0.0),
    ];
    let table = SheetTable::new("Customers", headers, vec![row]);

    let result = score_table(&table);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "missing_column");
        let data = error.data.unwrap_or_default();
        assert_eq!(data["column"], "Merchant Mix Index");
    }
}

#[test]
fn sheet_without_required_columns_reports_diagnostics() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(
        dir.path(),
        "partial.csv",
        "Customer ID,Utilisation %,Avg Payment Ratio\nC-1,10,90\n",
    );

    let result = score_path(&path);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "no_valid_sheet");
        let failure = failure_from_error(&error);
        let data = failure.data.unwrap_or_default();
        assert_eq!(data["sheets_found"], json!(["partial"]));
        assert_eq!(
            data["last_sheet_columns"],
            json!(["Customer ID", "Utilisation %", "Avg Payment Ratio"])
        );
    }
}

#[test]
fn first_sheet_with_customer_data_wins() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let customer_row = json!({
        "Customer ID": "C-1",
        "Credit Limit": 1000,
        "Utilisation %": 30,
        "Avg Payment Ratio": 90,
        "Min Due Paid Frequency": 10,
        "Merchant Mix Index": 0.2,
        "Cash Withdrawal %": 5,
        "Recent Spend Change %": 5,
    });
    let mut no_id_row = customer_row.clone();
    if let Some(object) = no_id_row.as_object_mut() {
        object.remove("Customer ID");
    }
    let workbook = json!({
        "sheets": [
            {"name": "Summary", "rows": [{"Metric": "customers", "Value": 1}]},
            {"name": "No IDs", "rows": [no_id_row]},
            {"name": "Customers", "rows": [customer_row]},
            {"name": "Later", "rows": [customer_row]},
        ]
    });
    let path = fixture(dir.path(), "book.json", &workbook.to_string());

    let result = score_path(&path);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.data["sheet_used"], "Customers");
        assert_eq!(
            envelope.data["sheets_found"],
            json!(["Summary", "No IDs", "Customers", "Later"])
        );
        assert_eq!(envelope.data["risk_counts"], json!({"Low": 1}));
    }
}

#[test]
fn non_numeric_cells_skip_the_sheet() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let body = CANONICAL_CSV.replacen("C-2,20000,30,90", "C-2,20000,thirty,90", 1);
    let path = fixture(dir.path(), "typed.csv", &body);

    let result = score_path(&path);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "no_valid_sheet");
    }
}

#[test]
fn absent_dpd_column_omits_delinquent_flag() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let body = "\
Customer ID,Credit Limit,Utilisation %,Avg Payment Ratio,Min Due Paid Frequency,Merchant Mix Index,Cash Withdrawal %,Recent Spend Change %,Segment
C-1,50000,80,40,60,0.8,25,-20,Retail
";
    let path = fixture(dir.path(), "no-dpd.csv", body);

    let result = score_path(&path);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let row = customer_by_id(&envelope.data, "C-1");
        assert!(row.is_some());
        if let Some(value) = row {
            assert!(value.get("Delinquent_Flag").is_none());
            assert_eq!(value["Delinquent_NextMonth_Flag"], 0);
            assert_eq!(value["Delinquent_NextMonth_Label"], "Not Delinquent Next Month");
            assert_eq!(value["Segment"], "Retail");
        }
    }
}

#[test]
fn scored_batches_are_recorded_when_a_store_is_given() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(dir.path(), "customers.csv", CANONICAL_CSV);
    let store = BatchStore::new(2);

    let result = score::run_with_options(ScoreRunOptions {
        path: Some(path.display().to_string()),
        stdin_override: None,
        store: Some(&store),
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let batch_id = envelope.data["batch_id"].as_str().unwrap_or_default().to_string();
        assert!(batch_id.starts_with("bat_"));
        let found = store.find_customer(Some(&batch_id), "C-3");
        assert!(found.is_ok());
        if let Ok(record) = found {
            assert_eq!(record.total_risk_flags, 2);
        }
    }
}

#[test]
fn stdin_rows_are_scored_as_json() {
    let rows = json!([{
        "Customer ID": "S-1",
        "Credit Limit": 100,
        "Utilisation %": 30,
        "Avg Payment Ratio": 90,
        "Min Due Paid Frequency": 10,
        "Merchant Mix Index": 0.2,
        "Cash Withdrawal %": 5,
        "Recent Spend Change %": 5,
    }]);

    let result = score::run_with_options(ScoreRunOptions {
        path: Some("-".to_string()),
        stdin_override: Some(rows.to_string().into_bytes()),
        store: None,
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.data["source_used"], "stdin");
        assert_eq!(envelope.data["risk_counts"], json!({"Low": 1}));
    }
}

#[test]
fn customer_lookup_returns_one_record_or_not_found() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(dir.path(), "customers.csv", CANONICAL_CSV);

    let found = customer::run(Some(path.display().to_string()), " C-2 ");
    assert!(found.is_ok());
    if let Ok(envelope) = found {
        assert_eq!(envelope.command, "customer");
        assert_eq!(envelope.data["customer"]["Customer ID"], "C-2");
        assert_eq!(envelope.data["sheet_used"], "customers");
    }

    let missing = customer::run_with_options(CustomerShowOptions {
        path: Some(path.display().to_string()),
        customer_id: "C-404".to_string(),
        stdin_override: None,
    });
    assert!(missing.is_err());
    if let Err(error) = missing {
        assert_eq!(error.code, "customer_not_found");
        assert_eq!(error.message, "Customer not found");
    }
}

#[test]
fn manual_entry_fills_gaps_and_pins_dpd() {
    let entry = manual::parse_entry(
        r#"{"avg_payment_ratio": 40, "recent_spend_change_pct": -20, "merchant_mix_index": 0.8,
            "utilisation_pct": 80, "min_due_paid_frequency": 60, "cash_withdrawal_pct": 25}"#,
    );
    assert!(entry.is_ok());
    let Ok(entry) = entry else {
        return;
    };

    let result = manual::run(&entry);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.command, "score manual");
        let customer = &envelope.data["customer"];
        assert_eq!(customer["Customer ID"], "MANUAL");
        assert_eq!(customer["Credit Limit"], 0);
        assert_eq!(customer["DPD Bucket Next Month"], 0);
        assert_eq!(customer["Total_Risk_Flags"], 6);
        assert_eq!(customer["Delinquent_Flag"], 0);
        assert_eq!(customer["Delinquent_NextMonth_Flag"], 0);
        assert_eq!(envelope.data["risk_counts"], json!({"High": 1}));
    }
}

#[test]
fn manual_entry_rejects_non_numeric_fields() {
    let entry = manual::parse_entry(r#"{"avg_payment_ratio": "forty"}"#);
    assert!(entry.is_err());
    if let Err(error) = entry {
        assert_eq!(error.code, "invalid_argument");
    }
}

#[test]
fn empty_file_is_reported_as_missing_upload() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else {
        return;
    };
    let path = fixture(dir.path(), "empty.csv", "");

    let result = score_path(&path);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "upload_empty");
    }
}

fn write_row(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    values: &[f64],
) -> Result<(), XlsxError> {
    for (col, value) in values.iter().enumerate() {
        sheet.write_number(row, col as u16, *value)?;
    }
    Ok(())
}

/// A "Summary" sheet, optionally followed by a "Customers" sheet with messy
/// headers and a blank row between its two customers.
fn portfolio_workbook(with_customers: bool) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet().set_name("Summary")?;
    summary.write_string(0, 0, "Metric")?;
    summary.write_string(0, 1, "Value")?;
    summary.write_string(1, 0, "customers")?;
    summary.write_number(1, 1, 2)?;

    if with_customers {
        let customers = workbook.add_worksheet().set_name("Customers")?;
        let headers = [
            "  customer id ",
            "CREDIT LIMIT",
            "utilisation %",
            "Avg Payment Ratio",
            "min due paid frequency",
            "Merchant\u{a0}Mix Index",
            "Cash Withdrawal %",
            "Recent Spend Change %",
            "DPD Bucket Next Month",
        ];
        for (col, header) in headers.iter().enumerate() {
            customers.write_string(0, col as u16, *header)?;
        }
        write_row(
            customers,
            1,
            &[1001.0, 50000.0, 80.0, 40.0, 60.0, 0.8, 25.0, -20.0, 2.0],
        )?;
        write_row(
            customers,
            3,
            &[1002.0, 20000.0, 30.0, 90.0, 10.0, 0.2, 5.0, 5.0, 0.0],
        )?;
    }

    workbook.save_to_buffer()
}

#[test]
fn xlsx_workbook_skips_summary_sheet_and_blank_rows() {
    let bytes = portfolio_workbook(true);
    assert!(bytes.is_ok());
    let Ok(bytes) = bytes else {
        return;
    };
    let store = BatchStore::new(2);
    let source = UploadSource::from_upload(Some("portfolio.xlsx".to_string()), bytes);

    let result = score::run_upload(&source, &store);
    assert!(result.is_ok());
    if let Ok(data) = result {
        assert_eq!(data.sheets_found, vec!["Summary", "Customers"]);
        assert_eq!(data.sheet_used, "Customers");
        assert_eq!(data.customers.len(), 2);
        assert!(data.batch_id.is_some());

        let first = &data.customers[0];
        assert_eq!(first["Customer ID"], "1001");
        assert_eq!(first["Total_Risk_Flags"], 6);
        assert_eq!(first["Risk_Level"], "High");
        assert_close(&first["Behaviour_Risk_Score"], 64.5);
        assert_eq!(first["Delinquent_Flag"], 1);

        let second = &data.customers[1];
        assert_eq!(second["Customer ID"], "1002");
        assert_eq!(second["Risk_Level"], "Low");
        assert_eq!(second["Delinquent_Flag"], 0);
    }
}

#[test]
fn xlsx_without_customer_sheet_lists_sheets_found() {
    let bytes = portfolio_workbook(false);
    assert!(bytes.is_ok());
    let Ok(bytes) = bytes else {
        return;
    };
    let store = BatchStore::new(2);
    let source = UploadSource::from_upload(Some("summary.xlsx".to_string()), bytes);

    let result = score::run_upload(&source, &store);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "no_valid_sheet");
        let data = error.data.unwrap_or_default();
        assert_eq!(data["sheets_found"], json!(["Summary"]));
        assert_eq!(data["last_sheet_columns"], json!(["Metric", "Value"]));
    }
    assert!(store.is_empty());
}
