//! Auth command - finish the OAuth flow

use anyhow::{Context, Result};
use dialoguer::Input;
use retention_core::SessionToken;

use super::get_context;
use crate::output;

pub async fn run(redirect: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    let input = match redirect {
        Some(value) => value,
        None => Input::<String>::new()
            .with_prompt("Paste the URL you were redirected to")
            .interact_text()
            .context("Failed to read redirect URL")?,
    };
    let input = input.trim();

    // A bare token is accepted as well as the full redirect URL
    if input.contains("://") {
        let stripped = ctx.auth_service.consume_redirect(input)?;
        tracing::debug!(url = %stripped, "redirect consumed");
    } else {
        ctx.auth_service.authenticate(&SessionToken::new(input)?)?;
    }

    let spinner = output::spinner("Authorizing");
    let result = ctx.auth_service.refresh().await;
    spinner.finish_and_clear();
    result.context("Sign-in was not accepted")?;

    match ctx.auth_service.user() {
        Some(user) => output::success(&format!("Signed in as {} <{}>", user.name, user.email)),
        None => output::warning("Token stored, but no profile was returned"),
    }
    Ok(())
}
