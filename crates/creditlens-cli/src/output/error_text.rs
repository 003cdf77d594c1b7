use creditlens_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Something went wrong, but it's easy to fix.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    lines.extend(render_sheet_diagnostics(error.data.as_ref()));

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    if let Some(help_command) = error
        .data
        .as_ref()
        .and_then(|data| data.get("help_command"))
        .and_then(Value::as_str)
    {
        lines.push(format!("  {}. Run `{help_command}`.", step_count(error) + 1));
    }

    lines.join("\n")
}

fn step_count(error: &ClientError) -> usize {
    error.recovery_steps.len().max(1)
}

// Sheet discovery failures carry the sheet names and the last header row tried.
fn render_sheet_diagnostics(data: Option<&Value>) -> Vec<String> {
    let Some(data) = data else {
        return Vec::new();
    };

    let join = |key: &str| {
        data.get(key).and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>()
                .join(", ")
        })
    };

    let mut lines = Vec::new();
    if let Some(sheets) = join("sheets_found") {
        lines.push(format!("  Sheets:   {sheets}"));
    }
    if let Some(columns) = join("last_sheet_columns") {
        lines.push(format!("  Columns:  {columns}"));
    }
    lines
}
