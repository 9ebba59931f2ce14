//! Tokens command - inspect and manage stored token records.

use anyhow::Result;
use clap::{Args, Subcommand};

use warden_oauth::AgePolicy;

use super::{Context, mask};

/// Arguments for the tokens command.
#[derive(Args, Debug)]
pub struct TokensArgs {
    #[command(subcommand)]
    pub command: TokensCommand,
}

#[derive(Subcommand, Debug)]
pub enum TokensCommand {
    /// List all records for the environment
    List,

    /// Show one record in full
    Show {
        /// Record id
        id: u64,

        /// Print the unmasked token value
        #[arg(long)]
        reveal: bool,
    },

    /// Mark a record inactive
    Deactivate {
        /// Record id
        id: u64,
    },

    /// Store a token obtained out-of-band as the new active record
    Inject {
        /// Access token value
        value: String,

        /// Refresh token to store alongside
        #[arg(long)]
        refresh_token: Option<String>,
    },
}

/// Run the tokens command.
pub async fn run(args: TokensArgs, ctx: &Context) -> Result<()> {
    match args.command {
        TokensCommand::List => cmd_list(ctx),
        TokensCommand::Show { id, reveal } => cmd_show(id, reveal, ctx),
        TokensCommand::Deactivate { id } => cmd_deactivate(id, ctx),
        TokensCommand::Inject {
            value,
            refresh_token,
        } => cmd_inject(value, refresh_token, ctx),
    }
}

fn cmd_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let records = store.list();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "No tokens stored for {} ({})",
            ctx.environment.name,
            store.path().display()
        );
        return Ok(());
    }

    println!(
        "{:>4}  {:^8}  {:<13}  {:>7}  {:<19}  {}",
        "id", "active", "value", "usage", "last used", "age"
    );
    for record in records {
        let age = match AgePolicy::age_hours(record) {
            Some(age) => format!("{age:.1}h"),
            None => "-".to_string(),
        };
        println!(
            "{:>4}  {:^8}  {:<13}  {:>7}  {:<19}  {}",
            record.id,
            if record.active { "yes" } else { "no" },
            mask(&record.value),
            record.usage,
            record
                .last_used
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            age
        );
    }

    Ok(())
}

fn cmd_show(id: u64, reveal: bool, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let Some(record) = store.get(id) else {
        anyhow::bail!("no token with id {id} for {}", ctx.environment.name);
    };

    if ctx.json_output {
        if reveal {
            println!("{}", serde_json::to_string_pretty(record)?);
        } else {
            let mut masked = record.clone();
            masked.value = mask(&record.value);
            masked.refresh_token = record.refresh_token.as_deref().map(mask);
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        return Ok(());
    }

    let value = if reveal {
        record.value.clone()
    } else {
        mask(&record.value)
    };
    let refresh = match record.refresh_token.as_deref() {
        Some(token) if reveal => token.to_string(),
        Some(token) => mask(token),
        None => "-".to_string(),
    };

    println!("id:            {}", record.id);
    println!("active:        {}", record.active);
    println!("value:         {}", value);
    println!("refresh token: {}", refresh);
    println!(
        "active from:   {}",
        record
            .active_from
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "last used:     {}",
        record
            .last_used
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("usage:         {}", record.usage);

    Ok(())
}

fn cmd_deactivate(id: u64, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    if !store.deactivate(id)? {
        anyhow::bail!("no token with id {id} for {}", ctx.environment.name);
    }
    println!("Token id {} deactivated.", id);
    Ok(())
}

fn cmd_inject(value: String, refresh_token: Option<String>, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let id = store.add_token(&value, refresh_token.as_deref())?;
    println!(
        "Stored token id {} as the active record for {}",
        id, ctx.environment.name
    );
    Ok(())
}
