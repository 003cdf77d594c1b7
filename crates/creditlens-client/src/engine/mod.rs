pub mod normalize;
pub mod record;
pub mod score;

pub use normalize::{canonical_header, normalize_headers, normalize_table};
pub use record::{CustomerRecord, records_from_table};
pub use score::{
    RiskFlags, RiskLevel, ScoreCategory, ScoredRecord, ScoredTable, risk_counts, score_record,
    score_records, score_table,
};
