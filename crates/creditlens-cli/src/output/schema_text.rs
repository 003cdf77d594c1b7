use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_schema_summary(data: &Value) -> io::Result<String> {
    let input_columns = columns_of(data, "input_columns")?;
    let output_columns = columns_of(data, "output_columns")?;

    let mut lines = vec![
        "CreditLens reads one customer per row and appends risk flags, scores, and labels."
            .to_string(),
        "Input headers are matched ignoring case and surrounding whitespace.".to_string(),
        String::new(),
        "Input columns:".to_string(),
    ];
    lines.extend(render_columns(input_columns));

    lines.push(String::new());
    lines.push("Output columns (appended after the input columns):".to_string());
    lines.extend(render_columns(output_columns));

    let required = data
        .get("required_sheet_columns")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>()
                .join(", ")
        })
        .unwrap_or_default();
    lines.push(String::new());
    lines.push("A sheet is used only when it provides:".to_string());
    lines.push(format!("  {required}"));

    Ok(lines.join("\n"))
}

fn columns_of<'a>(data: &'a Value, key: &str) -> io::Result<&'a Vec<Value>> {
    data.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other(format!("schema summary requires {key}")))
}

fn render_columns(columns: &[Value]) -> Vec<String> {
    let layout = [
        Column {
            name: "column",
            align: Align::Left,
        },
        Column {
            name: "type",
            align: Align::Left,
        },
        Column {
            name: "required",
            align: Align::Left,
        },
        Column {
            name: "description",
            align: Align::Left,
        },
    ];
    let rows = columns
        .iter()
        .map(|column| {
            let text = |key: &str| {
                column
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string()
            };
            let required = column
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            vec![
                text("name"),
                text("type"),
                if required { "yes" } else { "no" }.to_string(),
                text("description"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(&layout, &rows, format::terminal_width(), "Column")
}
