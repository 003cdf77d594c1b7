use serde::{Deserialize, Serialize};

use crate::engine::normalize::{
    AVG_PAYMENT_RATIO, CASH_WITHDRAWAL_PCT, CREDIT_LIMIT, CUSTOMER_ID, DPD_BUCKET_NEXT_MONTH,
    MERCHANT_MIX_INDEX, MIN_DUE_PAID_FREQUENCY, RECENT_SPEND_CHANGE_PCT, UTILISATION_PCT,
};
use crate::table::{Cell, SheetTable};

pub const MANUAL_CUSTOMER_ID: &str = "MANUAL";
pub const MANUAL_SHEET_NAME: &str = "Manual Entry";

/// A single customer typed in by hand, keyed with friendly snake_case names.
///
/// Any behavioural field left out is scored as `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub utilisation_pct: Option<f64>,
    #[serde(default)]
    pub avg_payment_ratio: Option<f64>,
    #[serde(default)]
    pub min_due_paid_frequency: Option<f64>,
    #[serde(default)]
    pub merchant_mix_index: Option<f64>,
    #[serde(default)]
    pub cash_withdrawal_pct: Option<f64>,
    #[serde(default)]
    pub recent_spend_change_pct: Option<f64>,
}

impl ManualEntry {
    /// One-row table with canonical headers; the DPD bucket is pinned to `0`.
    pub fn to_table(&self) -> SheetTable {
        let customer_id = self
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(MANUAL_CUSTOMER_ID);
        let number = |value: Option<f64>| Cell::Number(value.unwrap_or(0.0));

        let columns = vec![
            (CUSTOMER_ID, Cell::Text(customer_id.to_string())),
            (CREDIT_LIMIT, number(self.credit_limit)),
            (UTILISATION_PCT, number(self.utilisation_pct)),
            (AVG_PAYMENT_RATIO, number(self.avg_payment_ratio)),
            (MIN_DUE_PAID_FREQUENCY, number(self.min_due_paid_frequency)),
            (MERCHANT_MIX_INDEX, number(self.merchant_mix_index)),
            (CASH_WITHDRAWAL_PCT, number(self.cash_withdrawal_pct)),
            (RECENT_SPEND_CHANGE_PCT, number(self.recent_spend_change_pct)),
            (DPD_BUCKET_NEXT_MONTH, Cell::Number(0.0)),
        ];

        let (headers, row): (Vec<String>, Vec<Cell>) = columns
            .into_iter()
            .map(|(header, cell)| (header.to_string(), cell))
            .unzip();
        SheetTable::new(MANUAL_SHEET_NAME, headers, vec![row])
    }
}
