//! Terminal login driver.
//!
//! The provider's login UI runs in the operator's own browser; this driver
//! opens the authorization URL, notifies the operator that a sign-in (and
//! possibly an MFA approval) is pending, and reads the code-bearing
//! redirect URL back from stdin. Headless deployments swap in an automated
//! driver behind the same trait.

use async_trait::async_trait;

use warden_oauth::{AuthError, LoginContext, LoginDriver};

/// Interactive login driver for terminal sessions.
#[derive(Debug)]
pub struct ManualLoginDriver;

#[async_trait]
impl LoginDriver for ManualLoginDriver {
    async fn complete_login(&self, login: &LoginContext<'_>) -> warden_oauth::Result<String> {
        login
            .notifier
            .notify(&format!(
                "Interactive sign-in started; approve it within {}s",
                login.timeout.as_secs()
            ))
            .await;

        println!("Atlas Interactive Login");
        println!("=======================");
        println!();
        println!("Open this URL in your browser:");
        println!();
        println!("  {}", login.authorize_url);
        println!();
        if !login.credentials.username.is_empty() {
            println!("Sign in as: {}", login.credentials.username);
        }
        println!("Approve the MFA prompt on your phone when the number appears.");
        println!("After signing in, the browser lands on the redirect page.");
        println!("Paste the full redirect URL here:");
        println!();

        if open_url(login.authorize_url).is_err() {
            println!("(Could not open browser automatically)");
            println!();
        }

        print!("redirect url> ");
        use std::io::Write;
        std::io::stdout()
            .flush()
            .map_err(|e| AuthError::InteractiveAuthFailed(e.to_string()))?;

        // Stdin reads block, which would also block the surrounding timeout;
        // run the read on the blocking pool so the wait stays bounded.
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|e| AuthError::InteractiveAuthFailed(format!("stdin read failed: {e}")))?
        .map_err(|e| AuthError::InteractiveAuthFailed(format!("stdin read failed: {e}")))?;

        let input = line.trim();
        if input.is_empty() {
            return Err(AuthError::InteractiveAuthFailed(
                "no redirect URL provided".to_string(),
            ));
        }

        Ok(input.to_string())
    }
}

/// Try to open a URL in the default browser.
fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).status()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).status()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .status()?;
    }
    Ok(())
}
