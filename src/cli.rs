//! CLI argument parsing for the itinerary-worker binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "itinerary-worker", about = "Itinerary timeline worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Rebuild one plan's timeline and exit
    Rebuild {
        /// Plan to rebuild
        #[arg(long)]
        plan_id: i64,
        /// Print the result without writing it to the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_migrate_command_parses() {
        let cli = Cli::parse_from(["itinerary-worker", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["itinerary-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_serve_command_parses() {
        let cli = Cli::parse_from(["itinerary-worker", "serve"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_cli_rebuild_parses_plan_and_dry_run() {
        let cli = Cli::parse_from(["itinerary-worker", "rebuild", "--plan-id", "42", "--dry-run"]);
        assert!(matches!(
            cli.command,
            Some(Command::Rebuild { plan_id: 42, dry_run: true })
        ));
    }

    #[test]
    fn test_cli_rebuild_requires_plan_id() {
        assert!(Cli::try_parse_from(["itinerary-worker", "rebuild"]).is_err());
    }
}
