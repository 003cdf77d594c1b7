use clap::{Args, Parser, Subcommand};

/// Extended help shown after `creditlens score --help`.
pub const SCORE_AFTER_HELP: &str = "\
How scoring works:
  CreditLens reads a workbook, tries each sheet in file order, and scores the
  first sheet that carries customer-level behavioural data.

  Accepted formats:
    Excel  .xlsx, .xlsm, .xlsb, .xls and .ods workbooks
    CSV    one header row, one customer per line
    JSON   an array of row objects, or {\"sheets\": [{\"name\", \"rows\"}]}

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat customers.csv | creditlens score -

Required columns (matched ignoring case and surrounding whitespace):
  Customer ID, Credit Limit, Utilisation %, Avg Payment Ratio,
  Min Due Paid Frequency, Merchant Mix Index, Cash Withdrawal %,
  Recent Spend Change %

Optional columns:
  DPD Bucket Next Month   enables Delinquent_Flag in the output
  anything else           returned unchanged next to the scores

Scoring Troubleshooting:
  1. Run `creditlens schema` to see every input and output column.
  2. A sheet with a non-numeric value in a behavioural column is skipped.
  3. When no sheet qualifies, the error lists each sheet name and the
     columns of the last sheet tried.
";

pub const MANUAL_AFTER_HELP: &str = "\
Manual entry:
  Score one customer without a workbook. Pass a JSON object with --input,
  individual flags, or both (flags win). Missing fields are scored as 0 and
  the customer id defaults to MANUAL.

  Example:
    creditlens score manual --avg-payment-ratio 40 --utilisation-pct 80 \\
      --recent-spend-change-pct -20
    creditlens score manual --input '{\"avg_payment_ratio\": 40}' --json
";

#[derive(Debug, Parser)]
#[command(
    name = "creditlens",
    version,
    about = "behavioural credit-risk scoring",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every customer on the first usable sheet of a workbook
    #[command(
        after_long_help = SCORE_AFTER_HELP,
        args_conflicts_with_subcommands = true
    )]
    Score {
        #[command(subcommand)]
        command: Option<ScoreCommand>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to an Excel, CSV, or JSON workbook (use `-` for stdin)
        path: Option<String>,
    },
    /// Show the scored record for one customer in a workbook
    Customer {
        /// Path to an Excel, CSV, or JSON workbook (use `-` for stdin)
        path: String,
        /// The `Customer ID` value to look up
        customer_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List the input columns the engine reads and the columns it adds
    Schema {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP scoring API
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ScoreCommand {
    /// Score a single customer typed in by hand
    #[command(after_long_help = MANUAL_AFTER_HELP, allow_negative_numbers = true)]
    Manual(ManualArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ManualArgs {
    /// JSON object with snake_case fields (e.g. `{"avg_payment_ratio": 40}`)
    #[arg(long)]
    pub input: Option<String>,
    #[arg(long)]
    pub customer_id: Option<String>,
    #[arg(long)]
    pub credit_limit: Option<f64>,
    #[arg(long)]
    pub utilisation_pct: Option<f64>,
    #[arg(long)]
    pub avg_payment_ratio: Option<f64>,
    #[arg(long)]
    pub min_due_paid_frequency: Option<f64>,
    #[arg(long)]
    pub merchant_mix_index: Option<f64>,
    #[arg(long)]
    pub cash_withdrawal_pct: Option<f64>,
    #[arg(long)]
    pub recent_spend_change_pct: Option<f64>,
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Address to listen on [env: CREDITLENS_BIND] [default: 127.0.0.1:5000]
    #[arg(long)]
    pub bind: Option<String>,
    /// Comma-separated CORS origins, or `*` [env: CREDITLENS_ALLOWED_ORIGINS]
    #[arg(long)]
    pub allowed_origins: Option<String>,
    /// Largest accepted upload in bytes [env: CREDITLENS_MAX_UPLOAD_BYTES]
    #[arg(long)]
    pub max_upload_bytes: Option<String>,
    /// Scored batches kept for customer lookups [env: CREDITLENS_BATCH_CAPACITY]
    #[arg(long)]
    pub batch_capacity: Option<String>,
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
