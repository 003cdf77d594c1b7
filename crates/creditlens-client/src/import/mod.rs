pub mod input;
pub mod manual;
pub(crate) mod parse;
pub mod sheets;

use crate::ClientResult;
use crate::engine::score::{ScoredTable, score_table};
use crate::table::Workbook;

pub use input::UploadSource;
pub use manual::ManualEntry;

#[derive(Debug, Clone)]
pub struct ScoringExecution {
    pub source_kind: &'static str,
    pub sheets_found: Vec<String>,
    pub scored: ScoredTable,
}

/// Reads a CLI path (or `-`/stdin) and scores the first usable sheet.
pub(crate) fn execute_path(
    path: Option<String>,
    stdin_override: Option<Vec<u8>>,
) -> ClientResult<ScoringExecution> {
    let source = input::resolve_source(path, stdin_override)?;
    execute_upload(&source)
}

pub fn execute_upload(source: &UploadSource) -> ClientResult<ScoringExecution> {
    let workbook = read_workbook(source)?;
    let scored = sheets::select_scored_sheet(&workbook)?;
    Ok(ScoringExecution {
        source_kind: source.source_kind(),
        sheets_found: workbook.sheet_names(),
        scored,
    })
}

pub fn read_workbook(source: &UploadSource) -> ClientResult<Workbook> {
    parse::parse_workbook(source)
}

pub fn execute_manual(entry: &ManualEntry) -> ClientResult<ScoredTable> {
    score_table(&entry.to_table())
}
