use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ManualScoreData;
use crate::import::{self, ManualEntry};
use crate::{ClientError, ClientResult};

pub fn run(entry: &ManualEntry) -> ClientResult<SuccessEnvelope> {
    success("score manual", score(entry)?)
}

/// Parses the manual-entry JSON body used by `creditlens score manual --input`.
pub fn parse_entry(body: &str) -> ClientResult<ManualEntry> {
    serde_json::from_str::<ManualEntry>(body).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Manual entry must be a JSON object of numeric fields: {error}"),
            vec![
                "Use keys like `avg_payment_ratio` and `utilisation_pct`.".to_string(),
                "Run `creditlens score manual --help` for the full field list.".to_string(),
            ],
        )
    })
}

pub fn score(entry: &ManualEntry) -> ClientResult<ManualScoreData> {
    let scored = import::execute_manual(entry)?;
    let risk_counts = scored.risk_counts();
    let Some(record) = scored.records.first() else {
        return Err(ClientError::internal_serialization(
            "Manual scoring produced no record.",
        ));
    };

    Ok(ManualScoreData {
        customer: record.to_json()?,
        risk_counts,
    })
}
