//! Refresh command - force a refresh-token grant now.

use anyhow::Result;
use clap::Args;

use warden_oauth::{RefreshExecutor, TokenRefresher};

use super::{Context, mask};

/// Arguments for the refresh command.
#[derive(Args, Debug)]
pub struct RefreshArgs {}

/// Run the refresh command.
pub async fn run(_args: RefreshArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;

    if store.active_record().is_none() {
        anyhow::bail!(
            "no active token for {} (run 'warden login' first)",
            ctx.environment.name
        );
    }

    let refresher = RefreshExecutor::new(ctx.provider());
    refresher.refresh(&mut store).await?;

    // The record keeps its id; only value and timestamps change.
    if let Some(record) = store.active_record() {
        println!(
            "Token id {} refreshed for {} ({})",
            record.id,
            ctx.environment.name,
            mask(&record.value)
        );
    }

    Ok(())
}
