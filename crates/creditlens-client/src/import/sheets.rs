use crate::engine::normalize::{
    AVG_PAYMENT_RATIO, CASH_WITHDRAWAL_PCT, CREDIT_LIMIT, CUSTOMER_ID, MERCHANT_MIX_INDEX,
    MIN_DUE_PAID_FREQUENCY, RECENT_SPEND_CHANGE_PCT, UTILISATION_PCT,
};
use crate::engine::score::{ScoredTable, score_table};
use crate::table::Workbook;
use crate::{ClientError, ClientResult};

/// Columns a scored sheet must expose before it is accepted as customer data.
pub const REQUIRED_OUTPUT_COLUMNS: [&str; 8] = [
    CUSTOMER_ID,
    CREDIT_LIMIT,
    UTILISATION_PCT,
    AVG_PAYMENT_RATIO,
    MIN_DUE_PAID_FREQUENCY,
    MERCHANT_MIX_INDEX,
    CASH_WITHDRAWAL_PCT,
    RECENT_SPEND_CHANGE_PCT,
];

pub fn missing_output_columns(scored: &ScoredTable) -> Vec<&'static str> {
    REQUIRED_OUTPUT_COLUMNS
        .iter()
        .copied()
        .filter(|column| !scored.has_column(column))
        .collect()
}

/// Scores each sheet in file order and returns the first one that yields
/// complete customer output.
///
/// Sheets refused with a schema or type error, or whose output lacks a required
/// column, are skipped. When nothing qualifies the error lists every sheet name
/// and the raw headers of the last sheet tried.
pub fn select_scored_sheet(workbook: &Workbook) -> ClientResult<ScoredTable> {
    let mut last_columns: Option<Vec<String>> = None;

    for sheet in &workbook.sheets {
        log::debug!("trying sheet `{}` with columns {:?}", sheet.name, sheet.headers);
        last_columns = Some(sheet.headers.clone());

        let scored = match score_table(sheet) {
            Ok(value) => value,
            Err(error) if error.is_schema_or_type_error() => {
                log::info!("sheet `{}` skipped: {}", sheet.name, error.message);
                continue;
            }
            Err(error) => return Err(error),
        };

        let missing = missing_output_columns(&scored);
        if !missing.is_empty() {
            log::info!(
                "sheet `{}` skipped (missing after cleaning): {missing:?}",
                sheet.name
            );
            continue;
        }

        log::info!(
            "using sheet `{}` with {} customers",
            sheet.name,
            scored.records.len()
        );
        return Ok(scored);
    }

    Err(ClientError::no_valid_sheet(
        workbook.sheet_names(),
        last_columns,
    ))
}
