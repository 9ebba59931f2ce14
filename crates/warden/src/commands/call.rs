//! Call command - make an authenticated request against the environment API.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;

use warden_oauth::{RequestExecutor, UpstreamError};

use super::Context;

/// Timeout for a single API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Arguments for the call command.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Path relative to the environment's API base URL (e.g. /api/crm/task)
    pub path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

/// Run the call command.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let method = reqwest::Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid HTTP method '{}'", args.method))?;
    let body: Option<serde_json::Value> = args
        .body
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("request body is not valid JSON")?;

    let url = if args.path.starts_with('/') {
        format!("{}{}", ctx.environment.api_base_url, args.path)
    } else {
        format!("{}/{}", ctx.environment.api_base_url, args.path)
    };
    tracing::debug!(%url, method = %method, "issuing API request");

    let store = ctx.open_store()?;
    let mut executor = RequestExecutor::new(
        store,
        ctx.provider(),
        ctx.credentials(),
        ctx.authenticator(),
    )
    .with_policy(ctx.policy());

    let client = reqwest::Client::new();
    let (status, text) = executor
        .execute(move |token| {
            let client = client.clone();
            let method = method.clone();
            let url = url.clone();
            let body = body.clone();
            async move {
                let mut request = client
                    .request(method, &url)
                    .bearer_auth(&token)
                    .timeout(REQUEST_TIMEOUT);
                if let Some(json) = &body {
                    request = request.json(json);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| UpstreamError::Transport(e.to_string()))?;
                let http_status = response.status();
                let text = response
                    .text()
                    .await
                    .map_err(|e| UpstreamError::Transport(e.to_string()))?;

                if http_status.is_success() {
                    Ok((http_status.as_u16(), text))
                } else {
                    let message = if text.is_empty() {
                        http_status.canonical_reason().unwrap_or("").to_string()
                    } else {
                        text
                    };
                    Err(UpstreamError::Status {
                        status: http_status.as_u16(),
                        message,
                    })
                }
            }
        })
        .await?;

    tracing::debug!(status, "request completed");

    if ctx.json_output {
        // Re-emit the body as pretty JSON when it parses; raw otherwise.
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{text}"),
        }
    } else {
        if ctx.verbose {
            eprintln!("HTTP {status}");
        }
        if !text.is_empty() {
            println!("{text}");
        }
    }

    Ok(())
}
