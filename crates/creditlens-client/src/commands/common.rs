use crate::contracts::types::SchemaColumn;
use crate::engine::normalize::{
    AVG_PAYMENT_RATIO, CASH_WITHDRAWAL_PCT, CREDIT_LIMIT, CUSTOMER_ID, DPD_BUCKET_NEXT_MONTH,
    MERCHANT_MIX_INDEX, MIN_DUE_PAID_FREQUENCY, RECENT_SPEND_CHANGE_PCT, UTILISATION_PCT,
    behavioural_columns,
};

const INPUT_COLUMNS: [(&str, &str, &str); 9] = [
    (CUSTOMER_ID, "string", "Opaque customer identifier."),
    (CREDIT_LIMIT, "number", "Credit limit; carried through, not scored."),
    (UTILISATION_PCT, "number", "Share of the limit in use, in percent."),
    (AVG_PAYMENT_RATIO, "number", "Average share of the statement paid, in percent."),
    (
        MIN_DUE_PAID_FREQUENCY,
        "number",
        "How often only the minimum due was paid, in percent.",
    ),
    (MERCHANT_MIX_INDEX, "number", "Share of spend at risky merchants, 0 to 1."),
    (CASH_WITHDRAWAL_PCT, "number", "Cash withdrawals as a percent of spend."),
    (RECENT_SPEND_CHANGE_PCT, "number", "Signed change in recent spend, in percent."),
    (
        DPD_BUCKET_NEXT_MONTH,
        "number|null",
        "Days-past-due bucket observed next month, when known.",
    ),
];

const OUTPUT_COLUMNS: [(&str, &str, &str); 17] = [
    ("F1_PaymentLow", "integer", "Avg Payment Ratio < 50."),
    ("F2_SpendDrop", "integer", "Recent Spend Change % < -15."),
    ("F3_HighMerchantRisk", "integer", "Merchant Mix Index > 0.70."),
    (
        "F4_HighUtilisation",
        "integer",
        "Utilisation % > 75 with F1 or F2.",
    ),
    (
        "F5_PaymentStress",
        "integer",
        "Avg Payment Ratio < 50 and Min Due Paid Frequency > 50.",
    ),
    (
        "F6_CashWithdrawRisk",
        "integer",
        "Cash Withdrawal % > 20 and Avg Payment Ratio < 50.",
    ),
    ("Total_Risk_Flags", "integer", "Number of flags raised, 0 to 6."),
    ("Risk_Level", "text", "High at 3+ flags, Medium at 2, else Low."),
    (
        "Payment_Stress_Score",
        "real",
        "(100 - Avg Payment Ratio) * Min Due Paid Frequency / 100.",
    ),
    (
        "Behaviour_Risk_Score",
        "real",
        "Weighted blend of utilisation, payment, min-due, cash and merchant signals.",
    ),
    (
        "Behaviour_Risk_Category",
        "text",
        "High at 50+, Medium at 45+, else Low.",
    ),
    (
        "Payment_Stress_Category",
        "text",
        "High at 25+, Medium at 15+, else Low.",
    ),
    (
        "Risk_Reasons_Text",
        "text",
        "Labels of raised flags in F1..F6 order, or `Stable behaviour`.",
    ),
    (
        "Delinquent_Flag",
        "integer|null",
        "1 when the DPD bucket is >= 1; omitted when the bucket is unknown.",
    ),
    (
        "Delinquent_NextMonth_Flag",
        "integer",
        "1 when the DPD bucket is > 0.",
    ),
    (
        "Delinquent_NextMonth_Label",
        "text",
        "`Delinquent Next Month` or `Not Delinquent Next Month`.",
    ),
    (
        "<pass-through>",
        "any",
        "Unrecognised input columns are returned unchanged.",
    ),
];

pub fn input_column_contracts() -> Vec<SchemaColumn> {
    let behavioural = behavioural_columns();
    INPUT_COLUMNS
        .iter()
        .map(|(name, column_type, description)| SchemaColumn {
            name: name.to_string(),
            column_type: column_type.to_string(),
            required: behavioural.contains(name),
            description: description.to_string(),
        })
        .collect()
}

pub fn output_column_contracts() -> Vec<SchemaColumn> {
    OUTPUT_COLUMNS
        .iter()
        .map(|(name, column_type, description)| SchemaColumn {
            name: name.to_string(),
            column_type: column_type.to_string(),
            required: !column_type.ends_with("|null") && *column_type != "any",
            description: description.to_string(),
        })
        .collect()
}
