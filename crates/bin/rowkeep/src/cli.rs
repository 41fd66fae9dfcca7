//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rowkeep_domain::id::EntityId;

use crate::config::DEFAULT_PATH;

/// Manage rows of a `MySQL` schema through the rowkeep repositories.
#[derive(Debug, Parser)]
#[command(name = "rowkeep", version, about)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "ROWKEEP_CONFIG", default_value = DEFAULT_PATH)]
    pub config: PathBuf,

    /// Report statement failures and timings through the log.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Account operations.
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List every account.
    List,
    /// Show one account.
    Show { id: EntityId },
    /// Register an account with an already-hashed password.
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password_hash: String,
    },
    /// Change the email of an account.
    SetEmail { id: EntityId, email: String },
    /// Delete an account.
    Delete { id: EntityId },
    /// Tell whether a username is taken.
    Exists { username: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_add_with_global_flags() {
        let cli = Cli::try_parse_from([
            "rowkeep",
            "user",
            "add",
            "--username",
            "alice",
            "--email",
            "alice@example.com",
            "--password-hash",
            "$argon2id$hash",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Add { ref username, .. }) if username == "alice"
        ));
    }

    #[test]
    fn should_parse_ids() {
        let cli =
            Cli::try_parse_from(["rowkeep", "--config", "other.toml", "user", "show", "42"])
                .unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Show { id }) if id == EntityId::new(42)
        ));
    }

    #[test]
    fn should_reject_non_numeric_id() {
        let result = Cli::try_parse_from(["rowkeep", "user", "delete", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn should_require_subcommand() {
        assert!(Cli::try_parse_from(["rowkeep"]).is_err());
    }
}
