use std::collections::HashMap;

use crate::table::SheetTable;
use crate::{ClientError, ClientResult};

pub const CUSTOMER_ID: &str = "Customer ID";
pub const CREDIT_LIMIT: &str = "Credit Limit";
pub const UTILISATION_PCT: &str = "Utilisation %";
pub const AVG_PAYMENT_RATIO: &str = "Avg Payment Ratio";
pub const MIN_DUE_PAID_FREQUENCY: &str = "Min Due Paid Frequency";
pub const MERCHANT_MIX_INDEX: &str = "Merchant Mix Index";
pub const CASH_WITHDRAWAL_PCT: &str = "Cash Withdrawal %";
pub const RECENT_SPEND_CHANGE_PCT: &str = "Recent Spend Change %";
pub const DPD_BUCKET_NEXT_MONTH: &str = "DPD Bucket Next Month";

const CANONICAL_HEADERS: [(&str, &str); 9] = [
    ("customer id", CUSTOMER_ID),
    ("credit limit", CREDIT_LIMIT),
    ("utilisation %", UTILISATION_PCT),
    ("avg payment ratio", AVG_PAYMENT_RATIO),
    ("min due paid frequency", MIN_DUE_PAID_FREQUENCY),
    ("merchant mix index", MERCHANT_MIX_INDEX),
    ("cash withdrawal %", CASH_WITHDRAWAL_PCT),
    ("recent spend change %", RECENT_SPEND_CHANGE_PCT),
    ("dpd bucket next month", DPD_BUCKET_NEXT_MONTH),
];

const NO_BREAK_SPACE: char = '\u{00A0}';
const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Columns the engine reads to compute flags and scores.
pub fn behavioural_columns() -> [&'static str; 6] {
    [
        AVG_PAYMENT_RATIO,
        RECENT_SPEND_CHANGE_PCT,
        MERCHANT_MIX_INDEX,
        UTILISATION_PCT,
        MIN_DUE_PAID_FREQUENCY,
        CASH_WITHDRAWAL_PCT,
    ]
}

pub fn canonical_columns() -> Vec<&'static str> {
    CANONICAL_HEADERS
        .iter()
        .map(|(_, canonical)| *canonical)
        .collect()
}

pub fn clean_header(raw: &str) -> String {
    raw.trim()
        .replace(NO_BREAK_SPACE, " ")
        .replace(ZERO_WIDTH_SPACE, "")
        .trim()
        .to_string()
}

pub fn canonical_header(raw: &str) -> String {
    let cleaned = clean_header(raw);
    let lowered = cleaned.to_lowercase();
    CANONICAL_HEADERS
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(cleaned)
}

pub fn is_canonical(header: &str) -> bool {
    CANONICAL_HEADERS
        .iter()
        .any(|(_, canonical)| *canonical == header)
}

/// Maps every header onto the canonical schema, leaving unknown headers cleaned
/// but otherwise untouched.
///
/// Two inputs that land on the same canonical header fail with
/// `header_collision`. Repeated pass-through headers are suffixed `.1`, `.2`, ...
/// so every output column stays addressable.
pub fn normalize_headers(headers: &[String]) -> ClientResult<Vec<String>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut output = Vec::with_capacity(headers.len());

    for (index, raw) in headers.iter().enumerate() {
        let header = canonical_header(raw);
        if let Some(first_index) = seen.get(&header).copied() {
            if is_canonical(&header) {
                return Err(ClientError::header_collision(
                    &header,
                    first_index + 1,
                    index + 1,
                ));
            }
            let mut suffix = 1;
            let mut candidate = format!("{header}.{suffix}");
            while seen.contains_key(&candidate) {
                suffix += 1;
                candidate = format!("{header}.{suffix}");
            }
            seen.insert(candidate.clone(), index);
            output.push(candidate);
            continue;
        }
        seen.insert(header.clone(), index);
        output.push(header);
    }

    log::debug!("normalized columns: {output:?}");
    Ok(output)
}

/// Returns a copy of `table` with canonical headers; the input is not modified.
pub fn normalize_table(table: &SheetTable) -> ClientResult<SheetTable> {
    let headers = normalize_headers(&table.headers)?;
    Ok(SheetTable {
        name: table.name.clone(),
        headers,
        rows: table.rows.clone(),
    })
}
