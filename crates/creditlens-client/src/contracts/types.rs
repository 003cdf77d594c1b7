use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreData {
    pub path: Option<String>,
    pub source_used: String,
    pub sheets_found: Vec<String>,
    pub sheet_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub risk_counts: BTreeMap<String, i64>,
    pub customers: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualScoreData {
    pub customer: Value,
    pub risk_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerData {
    pub sheet_used: String,
    pub customer: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaData {
    pub input_columns: Vec<SchemaColumn>,
    pub output_columns: Vec<SchemaColumn>,
    pub required_sheet_columns: Vec<String>,
}
