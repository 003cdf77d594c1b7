use crate::cli::{Commands, ScoreCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    match command {
        Commands::Score {
            command: Some(ScoreCommand::Manual(args)),
            ..
        } => OutputMode::from_flag(args.json),
        Commands::Score { json, .. }
        | Commands::Customer { json, .. }
        | Commands::Schema { json } => OutputMode::from_flag(*json),
        Commands::Serve(_) => OutputMode::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn mode_follows_json_flag() {
        let cases: [(&[&str], OutputMode); 6] = [
            (&["creditlens", "score", "book.xlsx", "--json"], OutputMode::Json),
            (&["creditlens", "score", "book.xlsx"], OutputMode::Text),
            (&["creditlens", "score", "manual", "--json"], OutputMode::Json),
            (&["creditlens", "customer", "book.xlsx", "C-1", "--json"], OutputMode::Json),
            (&["creditlens", "schema"], OutputMode::Text),
            (&["creditlens", "serve"], OutputMode::Text),
        ];

        for (args, expected) in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok(), "failed to parse: {args:?}");
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), expected, "{args:?}");
            }
        }
    }
}
