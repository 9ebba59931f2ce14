//! Status command - show the credential state for the environment.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use warden_oauth::AgePolicy;

use super::{Context, mask};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    environment: String,
    authenticated: bool,
    token_id: Option<u64>,
    stale: Option<bool>,
    age_hours: Option<f64>,
    usage: Option<u64>,
    last_used: Option<String>,
    token_file: String,
}

/// Run the status command.
pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let policy = ctx.policy();
    let record = store.active_record();

    if ctx.json_output {
        let output = match record {
            Some(record) => StatusOutput {
                environment: ctx.environment.name.clone(),
                authenticated: true,
                token_id: Some(record.id),
                stale: Some(policy.is_stale(record)),
                age_hours: AgePolicy::age_hours(record),
                usage: Some(record.usage),
                last_used: record.last_used.map(|t| t.to_string()),
                token_file: store.path().display().to_string(),
            },
            None => StatusOutput {
                environment: ctx.environment.name.clone(),
                authenticated: false,
                token_id: None,
                stale: None,
                age_hours: None,
                usage: None,
                last_used: None,
                token_file: store.path().display().to_string(),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();

    println!();
    println!("{}", style("Warden Credential Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();
    println!(
        "  {} {}",
        dim.apply_to("Environment:"),
        ctx.environment.name
    );

    match record {
        Some(record) => {
            let stale = policy.is_stale(record);
            let state = if stale {
                Style::new().yellow().apply_to("● active (stale)")
            } else {
                Style::new().green().apply_to("● active (fresh)")
            };
            println!("  {} {}", dim.apply_to("Status:"), state);
            println!(
                "  {} id {}, {}",
                dim.apply_to("Token:"),
                record.id,
                mask(&record.value)
            );
            match AgePolicy::age_hours(record) {
                Some(age) => println!(
                    "  {} {:.1}h (limit {}h)",
                    dim.apply_to("Age:"),
                    age,
                    policy.max_age_hours()
                ),
                None => println!("  {} unknown (no activation time)", dim.apply_to("Age:")),
            }
            println!("  {} {} attempts", dim.apply_to("Usage:"), record.usage);
            if let Some(last_used) = record.last_used {
                println!(
                    "  {} {}",
                    dim.apply_to("Last used:"),
                    last_used.format("%Y-%m-%d %H:%M:%S")
                );
            }
            println!(
                "  {} {}",
                dim.apply_to("File:"),
                store.path().display()
            );
            if stale {
                println!();
                println!(
                    "  {}",
                    dim.apply_to("The next call refreshes this token before use.")
                );
            }
        }
        None => {
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                Style::new().red().apply_to("● no credential")
            );
            println!(
                "  {} {}",
                dim.apply_to("File:"),
                store.path().display()
            );
            println!();
            println!("  {}", dim.apply_to("Authenticate with: warden login"));
        }
    }

    println!();
    Ok(())
}
