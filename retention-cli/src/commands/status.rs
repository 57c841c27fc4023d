//! Status command - show configuration and session status

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use retention_core::adapters::token_store::FileTokenStore;
use retention_core::config::Config;
use retention_core::ports::TokenStore;
use serde::Serialize;

use super::{get_context, get_data_dir};
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    data_dir: String,
    api_domain: Option<String>,
    has_token: bool,
    signed_in_as: Option<String>,
    checked_at: DateTime<Utc>,
}

pub async fn run(json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)?;
    let has_token = FileTokenStore::new(&data_dir).load()?.is_some();

    let mut signed_in_as = None;
    if config.api_domain.is_some() && has_token {
        let ctx = get_context()?;
        let spinner = output::spinner("Loading");
        let result = ctx.auth_service.refresh().await;
        spinner.finish_and_clear();
        match result {
            Ok(()) => signed_in_as = ctx.auth_service.user().map(|u| u.email),
            Err(e) => tracing::warn!(error = %e, "could not load profile"),
        }
    }

    let report = StatusReport {
        data_dir: data_dir.display().to_string(),
        api_domain: config.api_domain.clone(),
        has_token,
        signed_in_as,
        checked_at: Utc::now(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Retention Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Data directory", &report.data_dir]);
    table.add_row(vec![
        "API domain",
        report.api_domain.as_deref().unwrap_or("not configured"),
    ]);
    table.add_row(vec!["Session token", if report.has_token { "stored" } else { "none" }]);
    table.add_row(vec![
        "Signed in as",
        report.signed_in_as.as_deref().unwrap_or("-"),
    ]);
    println!("{}", table);

    if report.api_domain.is_none() {
        println!();
        output::warning("Set apiDomain in settings.json or RETENTION_API_DOMAIN");
    }

    Ok(())
}
