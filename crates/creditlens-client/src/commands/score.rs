use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ScoreData;
use crate::import::{self, ScoringExecution, UploadSource};
use crate::store::BatchStore;
use crate::ClientResult;

#[derive(Debug, Default)]
pub struct ScoreRunOptions<'a> {
    pub path: Option<String>,
    pub stdin_override: Option<Vec<u8>>,
    pub store: Option<&'a BatchStore>,
}

pub fn run(path: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(ScoreRunOptions {
        path,
        stdin_override: None,
        store: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ScoreRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let execution = import::execute_path(options.path.clone(), options.stdin_override)?;
    let data = score_data(options.path, execution, options.store)?;
    success("score", data)
}

/// Scores an in-memory upload (the HTTP path) and records it in `store`.
pub fn run_upload(source: &UploadSource, store: &BatchStore) -> ClientResult<ScoreData> {
    let execution = import::execute_upload(source)?;
    score_data(source.file_name.clone(), execution, Some(store))
}

fn score_data(
    path: Option<String>,
    execution: ScoringExecution,
    store: Option<&BatchStore>,
) -> ClientResult<ScoreData> {
    let scored = execution.scored;
    let risk_counts = scored.risk_counts();
    let customers = scored
        .records
        .iter()
        .map(|record| record.to_json())
        .collect::<ClientResult<Vec<_>>>()?;
    let batch_id = store.map(|batches| {
        batches
            .insert(&scored.sheet_name, scored.records.clone())
            .batch_id
    });

    Ok(ScoreData {
        path,
        source_used: execution.source_kind.to_string(),
        sheets_found: execution.sheets_found,
        sheet_used: scored.sheet_name,
        batch_id,
        risk_counts,
        customers,
    })
}
