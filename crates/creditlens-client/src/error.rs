use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const SCORE_HELP_COMMAND: &str = "creditlens score --help";
pub(crate) const SCORE_HELP_SECTION_TITLE: &str = "Scoring Troubleshooting";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_score_help(self) -> Self {
        self.with_score_help_data(json!({}))
    }

    pub fn with_score_help_data(self, data: Value) -> Self {
        self.with_data(merge_score_help_data(data))
    }

    /// Schema failures are the ones sheet discovery may skip past.
    pub fn is_schema_or_type_error(&self) -> bool {
        matches!(
            self.code.as_str(),
            "missing_column" | "invalid_number" | "header_collision"
        )
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `creditlens {cmd} --help` for usage."),
            None => "Run `creditlens --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn upload_empty() -> Self {
        Self::new(
            "upload_empty",
            "No file uploaded",
            vec![
                "Attach a workbook in the `file` form field.".to_string(),
                "Or pass a file path: `creditlens score <path>`.".to_string(),
            ],
        )
        .with_score_help()
    }

    pub fn unsupported_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide an Excel workbook (.xlsx, .xls, .ods), a CSV file, or JSON rows."
                    .to_string(),
                "Run `creditlens score --help` to confirm the accepted layouts.".to_string(),
            ],
        )
        .with_score_help_data(json!({
            "received_format": received_format,
            "supported_formats": ["xlsx", "xls", "ods", "csv", "json"],
        }))
    }

    pub fn workbook_unreadable(detail: &str) -> Self {
        Self::new(
            "workbook_unreadable",
            "Unable to read Excel file",
            vec![
                "Check that the file is a valid, unencrypted workbook.".to_string(),
                "Re-export the sheet as CSV if the workbook keeps failing.".to_string(),
            ],
        )
        .with_score_help_data(json!({
            "details": detail,
        }))
    }

    pub fn missing_column(column: &str, available_columns: &[String]) -> Self {
        Self::new(
            "missing_column",
            &format!("Required column `{column}` is missing."),
            vec![
                format!("Add a `{column}` column to the customer sheet."),
                "Header matching ignores case and surrounding whitespace.".to_string(),
            ],
        )
        .with_score_help_data(json!({
            "column": column,
            "available_columns": available_columns,
        }))
    }

    pub fn invalid_number(row: usize, column: &str, received: &str) -> Self {
        Self::new(
            "invalid_number",
            &format!("Row {row}: `{column}` must be numeric; got \"{received}\"."),
            vec![
                format!("Fix the `{column}` value on row {row}."),
                "Use plain numbers without units or thousands separators.".to_string(),
            ],
        )
        .with_score_help_data(json!({
            "row": row,
            "column": column,
            "received": received,
        }))
    }

    pub fn header_collision(header: &str, first_position: usize, second_position: usize) -> Self {
        Self::new(
            "header_collision",
            &format!(
                "Columns {first_position} and {second_position} both map to `{header}`."
            ),
            vec![
                "Remove or rename one of the duplicate columns.".to_string(),
                "Header matching ignores case and surrounding whitespace.".to_string(),
            ],
        )
        .with_score_help_data(json!({
            "header": header,
            "positions": [first_position, second_position],
        }))
    }

    pub fn no_valid_sheet(sheets_found: Vec<String>, last_sheet_columns: Option<Vec<String>>) -> Self {
        Self::new(
            "no_valid_sheet",
            "No valid data sheet found in workbook.",
            vec![
                "Please upload the sheet that contains customer-level behavioural data."
                    .to_string(),
                "Run `creditlens schema` to list the required columns.".to_string(),
            ],
        )
        .with_data(json!({
            "hint": "Please upload the sheet that contains customer-level behavioural data.",
            "sheets_found": sheets_found,
            "last_sheet_columns": last_sheet_columns,
        }))
    }

    pub fn no_batch_available() -> Self {
        Self::new(
            "no_batch_available",
            "No data available",
            vec!["Upload a workbook to `/api/score` first.".to_string()],
        )
    }

    pub fn batch_not_found(batch_id: &str) -> Self {
        Self::new(
            "batch_not_found",
            &format!("Batch id `{batch_id}` was not found."),
            vec![
                "Batches are kept in memory only; re-upload the workbook.".to_string(),
            ],
        )
        .with_data(json!({
            "batch_id": batch_id,
        }))
    }

    pub fn customer_not_found(customer_id: &str) -> Self {
        Self::new(
            "customer_not_found",
            "Customer not found",
            vec![format!(
                "Check that `{customer_id}` appears in the `Customer ID` column."
            )],
        )
        .with_data(json!({
            "customer_id": customer_id,
        }))
    }

    pub fn invalid_config(key: &str, value: &str, detail: &str) -> Self {
        Self::new(
            "invalid_config",
            &format!("Invalid value `{value}` for `{key}`: {detail}"),
            vec![format!("Unset `{key}` or provide a valid value.")],
        )
        .with_data(json!({
            "key": key,
            "value": value,
        }))
    }

    pub fn server_failed(detail: &str) -> Self {
        Self::new(
            "internal_server_error",
            &format!("HTTP server failed: {detail}"),
            vec!["Check that the bind address is free and retry.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn internal_scoring_task(message: &str) -> Self {
        Self::new(
            "internal_scoring_task_error",
            &format!("Scoring task stopped before finishing: {message}"),
            Vec::new(),
        )
    }
}

fn merge_score_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(SCORE_HELP_COMMAND.to_string()),
        );
        object.insert(
            "help_section_title".to_string(),
            Value::String(SCORE_HELP_SECTION_TITLE.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;
