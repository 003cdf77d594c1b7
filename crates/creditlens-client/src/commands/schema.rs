use crate::ClientResult;
use crate::commands::common::{input_column_contracts, output_column_contracts};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::SchemaData;
use crate::import::sheets::REQUIRED_OUTPUT_COLUMNS;

pub fn summary() -> ClientResult<SuccessEnvelope> {
    let data = SchemaData {
        input_columns: input_column_contracts(),
        output_columns: output_column_contracts(),
        required_sheet_columns: REQUIRED_OUTPUT_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .collect(),
    };
    success("schema", data)
}
