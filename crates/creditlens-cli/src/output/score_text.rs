use std::io;

use serde_json::{Map, Value};

use super::format::{self, Align, Column, display_value};

const RISK_LEVELS: [&str; 3] = ["High", "Medium", "Low"];

pub fn render_score(data: &Value) -> io::Result<String> {
    let customers = data
        .get("customers")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("score output requires customers"))?;
    let sheet_used = get_str(data, "sheet_used");

    let mut lines = vec![
        format!(
            "Scored {} customer{} from sheet `{sheet_used}`.",
            customers.len(),
            if customers.len() == 1 { "" } else { "s" }
        ),
        String::new(),
        "Summary:".to_string(),
    ];

    let source = match data.get("path").and_then(Value::as_str) {
        Some(path) => format!("{} ({path})", get_str(data, "source_used")),
        None => get_str(data, "source_used").to_string(),
    };
    let sheets_found = data
        .get("sheets_found")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>()
                .join(", ")
        })
        .unwrap_or_default();
    let mut entries = vec![
        ("Source:", source),
        ("Sheets found:", sheets_found),
        ("Sheet used:", sheet_used.to_string()),
    ];
    if let Some(batch_id) = data.get("batch_id").and_then(Value::as_str) {
        entries.push(("Batch ID:", batch_id.to_string()));
    }
    lines.extend(format::key_value_rows(&entries, 2));

    lines.push(String::new());
    lines.push("Risk levels:".to_string());
    lines.extend(render_risk_counts(data.get("risk_counts")));

    if customers.is_empty() {
        lines.push(String::new());
        lines.push("The sheet has headers but no customer rows.".to_string());
        return Ok(lines.join("\n"));
    }

    lines.push(String::new());
    lines.push("Customers:".to_string());
    let columns = [
        Column {
            name: "Customer ID",
            align: Align::Left,
        },
        Column {
            name: "Risk",
            align: Align::Left,
        },
        Column {
            name: "Flags",
            align: Align::Right,
        },
        Column {
            name: "Behaviour",
            align: Align::Right,
        },
        Column {
            name: "Stress",
            align: Align::Right,
        },
        Column {
            name: "Reasons",
            align: Align::Left,
        },
    ];
    let rows = customers
        .iter()
        .map(|customer| {
            vec![
                field(customer, "Customer ID"),
                field(customer, "Risk_Level"),
                field(customer, "Total_Risk_Flags"),
                field(customer, "Behaviour_Risk_Score"),
                field(customer, "Payment_Stress_Score"),
                field(customer, "Risk_Reasons_Text"),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Customer",
    ));

    lines.push(String::new());
    lines.push("Inspect one customer in detail:".to_string());
    lines.push("  creditlens customer <path> <customer-id>".to_string());

    Ok(lines.join("\n"))
}

pub fn render_customer(data: &Value) -> io::Result<String> {
    let customer = data
        .get("customer")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("customer output requires customer"))?;

    let mut lines = vec![
        format!(
            "Customer {} is {} risk.",
            object_field(customer, "Customer ID"),
            object_field(customer, "Risk_Level")
        ),
        String::new(),
        format!("Sheet used: {}", get_str(data, "sheet_used")),
        String::new(),
    ];
    lines.extend(render_record(customer));
    Ok(lines.join("\n"))
}

pub fn render_manual(data: &Value) -> io::Result<String> {
    let customer = data
        .get("customer")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("manual score output requires customer"))?;

    let mut lines = vec![
        format!(
            "Manual entry scored as {} risk.",
            object_field(customer, "Risk_Level")
        ),
        String::new(),
    ];
    lines.extend(render_record(customer));
    Ok(lines.join("\n"))
}

fn render_record(record: &Map<String, Value>) -> Vec<String> {
    let mut lines = vec!["Record:".to_string()];
    let entries = record
        .iter()
        .map(|(key, value)| (key.as_str(), display_value(value)))
        .collect::<Vec<(&str, String)>>();
    lines.extend(format::key_value_rows(&entries, 2));
    lines
}

fn render_risk_counts(counts: Option<&Value>) -> Vec<String> {
    let entries = RISK_LEVELS
        .iter()
        .map(|level| {
            let count = counts
                .and_then(|value| value.get(*level))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            (*level, count.to_string())
        })
        .collect::<Vec<(&str, String)>>();
    format::key_value_rows(&entries, 2)
}

fn field(row: &Value, key: &str) -> String {
    row.get(key).map(display_value).unwrap_or_default()
}

fn object_field(row: &Map<String, Value>, key: &str) -> String {
    row.get(key)
        .map(display_value)
        .unwrap_or_else(|| "unknown".to_string())
}

fn get_str<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("unknown")
}
