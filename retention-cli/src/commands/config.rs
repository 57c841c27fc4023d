//! Config command - show or change settings.json

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use retention_core::config::{Config, API_DOMAIN_ENV};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the cashback backend domain
    SetDomain {
        /// Base URL, e.g. https://api.example.com
        domain: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => show(json),
        ConfigCommands::SetDomain { domain } => set_domain(&domain),
    }
}

fn show(json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)?;

    if json {
        let body = serde_json::json!({
            "dataDir": data_dir.display().to_string(),
            "apiDomain": config.api_domain,
            "requestTimeoutSecs": config.request_timeout.as_secs(),
            "scanner": config.scanner,
            "notifications": config.notifications,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", "Settings".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Data directory".to_string(), data_dir.display().to_string()]);
    table.add_row(vec![
        "API domain".to_string(),
        config.api_domain.clone().unwrap_or_else(|| "not configured".to_string()),
    ]);
    table.add_row(vec![
        "Request timeout".to_string(),
        format!("{}s", config.request_timeout.as_secs()),
    ]);
    table.add_row(vec![
        "Max scans per second".to_string(),
        config.scanner.max_scans_per_second.to_string(),
    ]);
    table.add_row(vec![
        "Capture size".to_string(),
        format!("{}x{}", config.scanner.capture_width, config.scanner.capture_height),
    ]);
    table.add_row(vec![
        "Visible notifications".to_string(),
        config.notifications.max_visible.to_string(),
    ]);
    table.add_row(vec![
        "Notification timeout".to_string(),
        format!("{}ms", config.notifications.auto_hide_ms),
    ]);
    println!("{}", table);

    Ok(())
}

fn set_domain(domain: &str) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let mut config = Config::load(&data_dir)?;
    config.set_api_domain(domain.trim());
    config.api_base_url()?;
    config.save(&data_dir)?;

    output::success(&format!("API domain set to {}", domain.trim()));
    if std::env::var_os(API_DOMAIN_ENV).is_some() {
        output::warning(&format!("{} is set and takes precedence", API_DOMAIN_ENV));
    }
    Ok(())
}
