use crate::engine::normalize::{
    AVG_PAYMENT_RATIO, CASH_WITHDRAWAL_PCT, CREDIT_LIMIT, CUSTOMER_ID, DPD_BUCKET_NEXT_MONTH,
    MERCHANT_MIX_INDEX, MIN_DUE_PAID_FREQUENCY, RECENT_SPEND_CHANGE_PCT, UTILISATION_PCT,
    behavioural_columns, is_canonical,
};
use crate::table::{Cell, SheetTable};
use crate::{ClientError, ClientResult};

/// One customer's behavioural snapshot with typed fields.
///
/// `dpd_bucket_next_month` is `None` when the column was not supplied or the
/// cell was blank; forward delinquency is then unknown for that row.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: Option<String>,
    pub credit_limit: Option<f64>,
    pub utilisation_pct: f64,
    pub avg_payment_ratio: f64,
    pub min_due_paid_frequency: f64,
    pub merchant_mix_index: f64,
    pub cash_withdrawal_pct: f64,
    pub recent_spend_change_pct: f64,
    pub dpd_bucket_next_month: Option<f64>,
    pub extra: Vec<(String, Cell)>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnPositions {
    customer_id: Option<usize>,
    credit_limit: Option<usize>,
    utilisation_pct: usize,
    avg_payment_ratio: usize,
    min_due_paid_frequency: usize,
    merchant_mix_index: usize,
    cash_withdrawal_pct: usize,
    recent_spend_change_pct: usize,
    dpd_bucket_next_month: Option<usize>,
}

/// Builds typed records from a table that already carries canonical headers.
///
/// Fails on the first missing behavioural column (checked before any row is
/// read) or the first non-numeric behavioural value, so no partial result escapes.
pub fn records_from_table(table: &SheetTable) -> ClientResult<Vec<CustomerRecord>> {
    let positions = locate_columns(table)?;
    let extra_columns = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !is_canonical(header))
        .map(|(index, header)| (index, header.clone()))
        .collect::<Vec<(usize, String)>>();

    let mut records = Vec::with_capacity(table.row_count());
    for row_index in 0..table.row_count() {
        let row_number = row_index + 1;
        let required = |column: usize, name: &str| -> ClientResult<f64> {
            let cell = table.cell(row_index, column);
            cell.as_number()
                .ok_or_else(|| ClientError::invalid_number(row_number, name, &cell.display_text()))
        };
        let optional = |column: Option<usize>, name: &str| -> ClientResult<Option<f64>> {
            let Some(index) = column else {
                return Ok(None);
            };
            let cell = table.cell(row_index, index);
            if cell.is_empty() {
                return Ok(None);
            }
            cell.as_number()
                .map(Some)
                .ok_or_else(|| ClientError::invalid_number(row_number, name, &cell.display_text()))
        };

        let customer_id = positions
            .customer_id
            .map(|index| table.cell(row_index, index))
            .filter(|cell| !cell.is_empty())
            .map(Cell::display_text);

        records.push(CustomerRecord {
            customer_id,
            credit_limit: optional(positions.credit_limit, CREDIT_LIMIT)?,
            utilisation_pct: required(positions.utilisation_pct, UTILISATION_PCT)?,
            avg_payment_ratio: required(positions.avg_payment_ratio, AVG_PAYMENT_RATIO)?,
            min_due_paid_frequency: required(
                positions.min_due_paid_frequency,
                MIN_DUE_PAID_FREQUENCY,
            )?,
            merchant_mix_index: required(positions.merchant_mix_index, MERCHANT_MIX_INDEX)?,
            cash_withdrawal_pct: required(positions.cash_withdrawal_pct, CASH_WITHDRAWAL_PCT)?,
            recent_spend_change_pct: required(
                positions.recent_spend_change_pct,
                RECENT_SPEND_CHANGE_PCT,
            )?,
            dpd_bucket_next_month: optional(
                positions.dpd_bucket_next_month,
                DPD_BUCKET_NEXT_MONTH,
            )?,
            extra: extra_columns
                .iter()
                .map(|(index, header)| (header.clone(), table.cell(row_index, *index).clone()))
                .collect(),
        });
    }

    Ok(records)
}

fn locate_columns(table: &SheetTable) -> ClientResult<ColumnPositions> {
    for column in behavioural_columns() {
        if table.column_index(column).is_none() {
            return Err(ClientError::missing_column(column, &table.headers));
        }
    }

    let position = |column: &str| -> ClientResult<usize> {
        table
            .column_index(column)
            .ok_or_else(|| ClientError::missing_column(column, &table.headers))
    };

    Ok(ColumnPositions {
        customer_id: table.column_index(CUSTOMER_ID),
        credit_limit: table.column_index(CREDIT_LIMIT),
        utilisation_pct: position(UTILISATION_PCT)?,
        avg_payment_ratio: position(AVG_PAYMENT_RATIO)?,
        min_due_paid_frequency: position(MIN_DUE_PAID_FREQUENCY)?,
        merchant_mix_index: position(MERCHANT_MIX_INDEX)?,
        cash_withdrawal_pct: position(CASH_WITHDRAWAL_PCT)?,
        recent_spend_change_pct: position(RECENT_SPEND_CHANGE_PCT)?,
        dpd_bucket_next_month: table.column_index(DPD_BUCKET_NEXT_MONTH),
    })
}
