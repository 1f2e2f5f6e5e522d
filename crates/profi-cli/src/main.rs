mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&cfg.logging.level);
    observability::init_tracing_with_level(level);
    tracing::debug!(config = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Issue(args) => commands::token::issue(cfg.validated_auth()?, &args)?,
        Commands::Inspect(args) => commands::token::inspect(cfg.validated_auth()?, &args)?,
        Commands::SignState(args) => commands::state::sign(cfg.validated_auth()?, &args)?,
        Commands::VerifyState(args) => commands::state::verify(cfg.validated_auth()?, &args)?,
        Commands::HashPassword(args) => commands::password::hash(&cfg.auth.password, args)?,
        Commands::VerifyPassword(args) => commands::password::verify(&cfg.auth.password, args)?,
        Commands::SendTestEmail(args) => {
            commands::mail::send_test_email(cfg.require_mail()?, &args).await?;
        }
    }

    Ok(())
}
