use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use profi_auth::Role;

#[derive(Parser)]
#[command(name = "profi")]
#[command(about = "FitProfi credential tool: issue and inspect sessions, signed state and password hashes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file (defaults to ./profi.toml when present)
    #[arg(short, long, global = true, env = "PROFI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a session credential
    Issue(IssueArgs),
    /// Decode a credential and print its claims
    Inspect(InspectArgs),
    /// Sign a state token for a redirect flow
    SignState(SignStateArgs),
    /// Verify a state token and print its user ID
    VerifyState(VerifyStateArgs),
    /// Hash a password
    HashPassword(HashPasswordArgs),
    /// Check a password against a stored hash
    VerifyPassword(VerifyPasswordArgs),
    /// Send a test email through the configured relay
    SendTestEmail(SendTestEmailArgs),
}

#[derive(clap::Args)]
pub struct IssueArgs {
    /// Account ID
    #[arg(long)]
    pub user_id: i64,
    /// Role to embed (user or admin)
    #[arg(long, default_value = "user")]
    pub role: Role,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// The credential
    pub token: String,
}

#[derive(clap::Args)]
pub struct SignStateArgs {
    /// Account ID
    #[arg(long)]
    pub user_id: i64,
}

#[derive(clap::Args)]
pub struct VerifyStateArgs {
    /// The state token
    pub state: String,
    /// Maximum age, e.g. 10m (defaults to auth.state_max_age)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub max_age: Option<Duration>,
}

#[derive(clap::Args)]
pub struct HashPasswordArgs {
    /// Password (reads stdin if omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct VerifyPasswordArgs {
    /// PHC hash string
    #[arg(long)]
    pub hash: String,
    /// Password (reads stdin if omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct SendTestEmailArgs {
    /// Recipient address
    #[arg(long)]
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issue() {
        let cli = Cli::parse_from(["profi", "issue", "--user-id", "42", "--role", "admin"]);
        match cli.command {
            Commands::Issue(args) => {
                assert_eq!(args.user_id, 42);
                assert_eq!(args.role, Role::Admin);
            }
            _ => panic!("expected issue"),
        }
    }

    #[test]
    fn test_parse_verify_state_max_age() {
        let cli = Cli::parse_from(["profi", "verify-state", "abc.def", "--max-age", "5m"]);
        match cli.command {
            Commands::VerifyState(args) => {
                assert_eq!(args.state, "abc.def");
                assert_eq!(args.max_age, Some(Duration::from_secs(300)));
            }
            _ => panic!("expected verify-state"),
        }
    }

    #[test]
    fn test_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["profi", "issue", "--user-id", "1", "--role", "root"]).is_err());
    }
}
