//! Rule-based behavioural risk scoring.
//!
//! Every rule reads a single [`CustomerRecord`]; rows never influence each
//! other, and output order always matches input order.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::engine::normalize::{
    AVG_PAYMENT_RATIO, CASH_WITHDRAWAL_PCT, CREDIT_LIMIT, CUSTOMER_ID, DPD_BUCKET_NEXT_MONTH,
    MERCHANT_MIX_INDEX, MIN_DUE_PAID_FREQUENCY, RECENT_SPEND_CHANGE_PCT, UTILISATION_PCT,
    normalize_table,
};
use crate::engine::record::{CustomerRecord, records_from_table};
use crate::table::{SheetTable, number_to_json};
use crate::ClientResult;

pub const STABLE_BEHAVIOUR: &str = "Stable behaviour";
pub const DELINQUENT_NEXT_MONTH: &str = "Delinquent Next Month";
pub const NOT_DELINQUENT_NEXT_MONTH: &str = "Not Delinquent Next Month";

const FLAG_FIELDS: [&str; 6] = [
    "F1_PaymentLow",
    "F2_SpendDrop",
    "F3_HighMerchantRisk",
    "F4_HighUtilisation",
    "F5_PaymentStress",
    "F6_CashWithdrawRisk",
];

const FLAG_REASONS: [&str; 6] = [
    "Low Payment Ratio",
    "Recent Spend Drop",
    "High-Risk Merchant Spending",
    "High Utilisation",
    "Payment Stress",
    "High Cash Withdrawal",
];

const DERIVED_FIELDS: [&str; 10] = [
    "Total_Risk_Flags",
    "Risk_Level",
    "Payment_Stress_Score",
    "Behaviour_Risk_Score",
    "Behaviour_Risk_Category",
    "Payment_Stress_Category",
    "Risk_Reasons_Text",
    "Delinquent_Flag",
    "Delinquent_NextMonth_Flag",
    "Delinquent_NextMonth_Label",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiskFlags {
    pub payment_low: bool,
    pub spend_drop: bool,
    pub high_merchant_risk: bool,
    pub high_utilisation: bool,
    pub payment_stress: bool,
    pub cash_withdraw_risk: bool,
}

impl RiskFlags {
    pub fn evaluate(record: &CustomerRecord) -> Self {
        let payment_low = record.avg_payment_ratio < 50.0;
        let spend_drop = record.recent_spend_change_pct < -15.0;
        Self {
            payment_low,
            spend_drop,
            high_merchant_risk: record.merchant_mix_index > 0.70,
            high_utilisation: record.utilisation_pct > 75.0 && (payment_low || spend_drop),
            payment_stress: record.avg_payment_ratio < 50.0
                && record.min_due_paid_frequency > 50.0,
            cash_withdraw_risk: record.cash_withdrawal_pct > 20.0
                && record.avg_payment_ratio < 50.0,
        }
    }

    /// Flags in F1..F6 order.
    pub fn as_array(&self) -> [bool; 6] {
        [
            self.payment_low,
            self.spend_drop,
            self.high_merchant_risk,
            self.high_utilisation,
            self.payment_stress,
            self.cash_withdraw_risk,
        ]
    }

    pub fn total(&self) -> u8 {
        self.as_array().iter().filter(|flag| **flag).count() as u8
    }

    pub fn reasons(&self) -> Vec<&'static str> {
        self.as_array()
            .iter()
            .zip(FLAG_REASONS)
            .filter(|(flag, _)| **flag)
            .map(|(_, reason)| reason)
            .collect()
    }

    pub fn reasons_text(&self) -> String {
        let reasons = self.reasons();
        if reasons.is_empty() {
            return STABLE_BEHAVIOUR.to_string();
        }
        reasons.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_flag_total(total: u8) -> Self {
        if total >= 3 {
            Self::High
        } else if total == 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCategory {
    Low,
    Medium,
    High,
}

impl ScoreCategory {
    pub fn behaviour(score: f64) -> Self {
        Self::tier(score, 50.0, 45.0)
    }

    pub fn payment_stress(score: f64) -> Self {
        Self::tier(score, 25.0, 15.0)
    }

    fn tier(score: f64, high: f64, medium: f64) -> Self {
        if score >= high {
            Self::High
        } else if score >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

pub fn payment_stress_score(record: &CustomerRecord) -> f64 {
    (100.0 - record.avg_payment_ratio) * (record.min_due_paid_frequency / 100.0)
}

pub fn behaviour_risk_score(record: &CustomerRecord) -> f64 {
    0.3 * record.utilisation_pct
        + 0.3 * (100.0 - record.avg_payment_ratio)
        + 0.2 * record.min_due_paid_frequency
        + 0.1 * record.cash_withdrawal_pct
        + 0.1 * (record.merchant_mix_index * 100.0)
}

/// Forward-looking delinquency derived from the next-month DPD bucket.
///
/// `flag` uses `>= 1` while `next_month_flag` uses `> 0`; the two only
/// disagree for fractional buckets in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delinquency {
    pub flag: Option<u8>,
    pub next_month_flag: u8,
}

impl Delinquency {
    pub fn from_bucket(bucket: Option<f64>) -> Self {
        match bucket {
            Some(value) => Self {
                flag: Some(u8::from(value >= 1.0)),
                next_month_flag: u8::from(value > 0.0),
            },
            None => Self {
                flag: None,
                next_month_flag: 0,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        if self.next_month_flag == 1 {
            DELINQUENT_NEXT_MONTH
        } else {
            NOT_DELINQUENT_NEXT_MONTH
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub input: CustomerRecord,
    pub flags: RiskFlags,
    pub total_risk_flags: u8,
    pub risk_level: RiskLevel,
    pub payment_stress_score: f64,
    pub behaviour_risk_score: f64,
    pub behaviour_risk_category: ScoreCategory,
    pub payment_stress_category: ScoreCategory,
    pub risk_reasons_text: String,
    pub delinquency: Delinquency,
}

impl ScoredRecord {
    pub fn customer_id(&self) -> Option<&str> {
        self.input.customer_id.as_deref()
    }

    pub fn to_json(&self) -> ClientResult<Value> {
        serde_json::to_value(self)
            .map_err(|error| crate::ClientError::internal_serialization(&error.to_string()))
    }
}

impl Serialize for ScoredRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let input = &self.input;
        let mut map = serializer.serialize_map(None)?;
        if let Some(customer_id) = &input.customer_id {
            map.serialize_entry(CUSTOMER_ID, customer_id)?;
        }
        if let Some(credit_limit) = input.credit_limit {
            map.serialize_entry(CREDIT_LIMIT, &number_to_json(credit_limit))?;
        }
        map.serialize_entry(UTILISATION_PCT, &number_to_json(input.utilisation_pct))?;
        map.serialize_entry(AVG_PAYMENT_RATIO, &number_to_json(input.avg_payment_ratio))?;
        map.serialize_entry(
            MIN_DUE_PAID_FREQUENCY,
            &number_to_json(input.min_due_paid_frequency),
        )?;
        map.serialize_entry(MERCHANT_MIX_INDEX, &number_to_json(input.merchant_mix_index))?;
        map.serialize_entry(CASH_WITHDRAWAL_PCT, &number_to_json(input.cash_withdrawal_pct))?;
        map.serialize_entry(
            RECENT_SPEND_CHANGE_PCT,
            &number_to_json(input.recent_spend_change_pct),
        )?;
        if let Some(bucket) = input.dpd_bucket_next_month {
            map.serialize_entry(DPD_BUCKET_NEXT_MONTH, &number_to_json(bucket))?;
        }
        for (header, cell) in &input.extra {
            map.serialize_entry(header, &cell.to_json())?;
        }

        for (field, flag) in FLAG_FIELDS.iter().zip(self.flags.as_array()) {
            map.serialize_entry(field, &u8::from(flag))?;
        }
        map.serialize_entry("Total_Risk_Flags", &self.total_risk_flags)?;
        map.serialize_entry("Risk_Level", self.risk_level.as_str())?;
        map.serialize_entry(
            "Payment_Stress_Score",
            &number_to_json(self.payment_stress_score),
        )?;
        map.serialize_entry(
            "Behaviour_Risk_Score",
            &number_to_json(self.behaviour_risk_score),
        )?;
        map.serialize_entry(
            "Behaviour_Risk_Category",
            self.behaviour_risk_category.as_str(),
        )?;
        map.serialize_entry(
            "Payment_Stress_Category",
            self.payment_stress_category.as_str(),
        )?;
        map.serialize_entry("Risk_Reasons_Text", &self.risk_reasons_text)?;
        if let Some(flag) = self.delinquency.flag {
            map.serialize_entry("Delinquent_Flag", &flag)?;
        }
        map.serialize_entry(
            "Delinquent_NextMonth_Flag",
            &self.delinquency.next_month_flag,
        )?;
        map.serialize_entry("Delinquent_NextMonth_Label", self.delinquency.label())?;
        map.end()
    }
}

/// Scores one record. Pure: the same record always yields the same result.
pub fn score_record(record: &CustomerRecord) -> ScoredRecord {
    let flags = RiskFlags::evaluate(record);
    let total_risk_flags = flags.total();
    let payment_stress = payment_stress_score(record);
    let behaviour_risk = behaviour_risk_score(record);

    ScoredRecord {
        input: record.clone(),
        flags,
        total_risk_flags,
        risk_level: RiskLevel::from_flag_total(total_risk_flags),
        payment_stress_score: payment_stress,
        behaviour_risk_score: behaviour_risk,
        behaviour_risk_category: ScoreCategory::behaviour(behaviour_risk),
        payment_stress_category: ScoreCategory::payment_stress(payment_stress),
        risk_reasons_text: flags.reasons_text(),
        delinquency: Delinquency::from_bucket(record.dpd_bucket_next_month),
    }
}

pub fn score_records(records: &[CustomerRecord]) -> Vec<ScoredRecord> {
    records.iter().map(score_record).collect()
}

/// Output of one scoring pass over a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub records: Vec<ScoredRecord>,
}

impl ScoredTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|candidate| candidate == column)
    }

    pub fn risk_counts(&self) -> BTreeMap<String, i64> {
        risk_counts(&self.records)
    }
}

/// Normalizes headers, builds typed records, and scores every row.
///
/// Either every row is scored or the whole table is refused with a schema
/// (`missing_column`, `header_collision`) or type (`invalid_number`) error.
pub fn score_table(table: &SheetTable) -> ClientResult<ScoredTable> {
    let normalized = normalize_table(table)?;
    let records = records_from_table(&normalized)?;
    let has_dpd = normalized.column_index(DPD_BUCKET_NEXT_MONTH).is_some();

    let mut columns = normalized.headers.clone();
    columns.extend(FLAG_FIELDS.iter().map(|field| field.to_string()));
    columns.extend(
        DERIVED_FIELDS
            .iter()
            .filter(|field| has_dpd || **field != "Delinquent_Flag")
            .map(|field| field.to_string()),
    );

    Ok(ScoredTable {
        sheet_name: normalized.name,
        columns,
        records: score_records(&records),
    })
}

/// Counts records per risk level, listing only levels that occur.
pub fn risk_counts(records: &[ScoredRecord]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.risk_level.as_str().to_string())
            .or_insert(0) += 1;
    }
    counts
}
