mod cli;
mod dispatch;
mod output;
mod serve;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use creditlens_client::ClientError;
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "CreditLens - behavioural credit-risk scoring

Usage:
  creditlens <command>

Start here:
  creditlens score <path>
  creditlens score --help
  creditlens schema
";

const TOP_LEVEL_HELP: &str = "CreditLens — behavioural credit-risk scoring

USAGE: creditlens <command>

Score a portfolio:
  1. creditlens schema                                    List the columns a sheet needs
  2. creditlens score <path>                              Score the first usable sheet of a workbook
  3. creditlens customer <path> <customer-id>             Show one scored customer in detail

Score one customer by hand:
  creditlens score manual --avg-payment-ratio 40 --utilisation-pct 80

Run the HTTP API:
  creditlens serve                                        Listen on 127.0.0.1:5000 (see `serve --help`)

Add --json to score, customer, or schema for machine-readable output.
Run `creditlens score --help` for accepted formats and troubleshooting.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    init_logging(&cli.command);

    if let cli::Commands::Serve(args) = &cli.command {
        return match serve::run(args) {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(error) => {
                if output::print_failure(&error, output::OutputMode::Text).is_err() {
                    return Err(ExitCode::from(2));
                }
                Err(exit_code_for_error(&error))
            }
        };
    }

    let mode = output::mode_for_command(&cli.command);
    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        let text = if err.kind() == ErrorKind::DisplayHelp && is_top_level_help_request(raw_args) {
            TOP_LEVEL_HELP.to_string()
        } else {
            err.to_string()
        };
        if write_stdout_text(&text).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let command_hint = if matches!(
        err.kind(),
        ErrorKind::MissingRequiredArgument
            | ErrorKind::InvalidValue
            | ErrorKind::ValueValidation
            | ErrorKind::WrongNumberOfValues
            | ErrorKind::UnknownArgument
            | ErrorKind::InvalidSubcommand
    ) {
        command_path_from_args(raw_args)
    } else {
        None
    };
    let clean_message = strip_clap_boilerplate(&err.to_string());
    let parse_error = ClientError::invalid_argument_for_command(&clean_message, command_hint);
    let mode = infer_requested_output_mode(raw_args);
    if output::print_failure(&parse_error, mode).is_err() {
        return Err(ExitCode::from(2));
    }
    Err(ExitCode::from(1))
}

/// `RUST_LOG` wins; otherwise `serve` logs requests at info and other commands stay quiet.
fn init_logging(command: &cli::Commands) {
    let default_level = match command {
        cli::Commands::Serve(_) => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing Usage line and "For more information" hint
/// so the "What to do next" section is the single source of guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let non_flags = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    match non_flags.as_slice() {
        ["score", "manual", ..] => Some("score manual"),
        ["score", ..] => Some("score"),
        ["customer", ..] => Some("customer"),
        ["schema", ..] => Some("schema"),
        ["serve", ..] => Some("serve"),
        _ => None,
    }
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.code.starts_with("internal_") {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
