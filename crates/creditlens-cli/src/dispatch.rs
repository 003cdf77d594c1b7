use std::io::Read;

use creditlens_client::commands;
use creditlens_client::import::ManualEntry;
use creditlens_client::{ClientError, ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, ManualArgs, ScoreCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Score { command, path, .. } => match command {
            Some(ScoreCommand::Manual(args)) => commands::manual::run(&manual_entry(args)?),
            None => commands::score::run(path.clone()),
        },
        Commands::Customer {
            path, customer_id, ..
        } => commands::customer::run(Some(path.clone()), customer_id),
        Commands::Schema { .. } => commands::schema::summary(),
        Commands::Serve(_) => Err(ClientError::invalid_argument_for_command(
            "`serve` runs the HTTP API and does not produce command output.",
            Some("serve"),
        )),
    }
}

/// Builds the entry from `--input` (or stdin for `-`), then applies any per-field flags.
pub fn manual_entry(args: &ManualArgs) -> ClientResult<ManualEntry> {
    let mut entry = match args.input.as_deref() {
        Some("-") => commands::manual::parse_entry(&read_stdin_text()?)?,
        Some(body) => commands::manual::parse_entry(body)?,
        None => ManualEntry::default(),
    };

    if let Some(customer_id) = &args.customer_id {
        entry.customer_id = Some(customer_id.clone());
    }
    let overrides = [
        (&mut entry.credit_limit, args.credit_limit),
        (&mut entry.utilisation_pct, args.utilisation_pct),
        (&mut entry.avg_payment_ratio, args.avg_payment_ratio),
        (&mut entry.min_due_paid_frequency, args.min_due_paid_frequency),
        (&mut entry.merchant_mix_index, args.merchant_mix_index),
        (&mut entry.cash_withdrawal_pct, args.cash_withdrawal_pct),
        (&mut entry.recent_spend_change_pct, args.recent_spend_change_pct),
    ];
    for (slot, flag) in overrides {
        if flag.is_some() {
            *slot = flag;
        }
    }

    Ok(entry)
}

fn read_stdin_text() -> ClientResult<String> {
    let mut body = String::new();
    std::io::stdin().read_to_string(&mut body).map_err(|error| {
        ClientError::invalid_argument_for_command(
            &format!("Could not read manual entry from stdin: {error}"),
            Some("score manual"),
        )
    })?;
    Ok(body)
}
