//! Login command - authenticate interactively and store a fresh token.

use anyhow::Result;
use clap::Args;

use warden_oauth::AgePolicy;

use super::Context;

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Re-authenticate even when a fresh credential exists
    #[arg(long)]
    pub force: bool,
}

/// Run the login command.
pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_store()?;

    // Skip the whole flow when the stored credential is still usable.
    if !args.force
        && let Some(record) = store.active_record()
        && !ctx.policy().is_stale(record)
    {
        let age = AgePolicy::age_hours(record).unwrap_or(0.0);
        println!(
            "Already authenticated against {} (token id {}, {:.1}h old)",
            ctx.environment.name, record.id, age
        );
        println!("Run 'warden login --force' to re-authenticate.");
        return Ok(());
    }

    let credentials = ctx.credentials();
    let authenticator = ctx.authenticator();
    let pair = authenticator
        .authenticate(&credentials, &ctx.provider())
        .await?;

    let id = store.add_token(&pair.access, Some(&pair.refresh))?;

    println!();
    println!("Authentication successful.");
    println!(
        "Stored token id {} for {} in {}",
        id,
        ctx.environment.name,
        store.path().display()
    );

    Ok(())
}
