//! Warden - OAuth credential lifecycle manager for the Atlas API.
//!
//! Main entry point for the warden CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod driver;

use commands::{call, login, refresh, status, tokens};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Warden - OAuth credential lifecycle manager for the Atlas API
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Environment to operate against (staging, production, ...)
    #[arg(short, long, global = true, env = "WARDEN_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate interactively and store a fresh token
    Login(login::LoginArgs),

    /// Show the credential state for the environment
    Status(status::StatusArgs),

    /// Force a refresh-token grant now
    Refresh(refresh::RefreshArgs),

    /// Inspect and manage stored token records
    Tokens(tokens::TokensArgs),

    /// Make an authenticated request against the environment API
    Call(call::CallArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "warden=debug,warden_oauth=debug,warden_config=debug,info"
    } else {
        "warden=info,warden_oauth=info,warden_config=info,warn"
    };

    let log_dir = warden_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "warden.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "warden=trace,warden_oauth=trace,warden_config=trace,info",
                )),
        )
        .init();

    // Load and resolve configuration
    let loaded = warden_config::load_config(None)?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let environment =
        warden_config::resolve_environment(&loaded.config, cli.environment.as_deref())?;
    tracing::debug!(environment = %environment.name, "environment resolved");

    // Create context for commands
    let ctx = commands::Context {
        environment,
        config: loaded.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Login(args) => login::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Refresh(args) => refresh::run(args, &ctx).await,
        Commands::Tokens(args) => tokens::run(args, &ctx).await,
        Commands::Call(args) => call::run(args, &ctx).await,
    }
}
