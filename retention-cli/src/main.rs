//! Retention CLI - Retention Chain cashback in your terminal

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{auth, config, login, logout, me, scan, status, submit};

const DEFAULT_LOG_FILTER: &str = "retention_core=info,retention_cli=info";

/// Retention - scan receipts, earn cashback
#[derive(Parser)]
#[command(name = "retention", version, about, long_about = None)]
struct Cli {
    /// Log debug output from the scan pipeline
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URL that starts Google sign-in
    Login,

    /// Finish sign-in with the redirect URL or a raw session token
    Auth {
        /// Redirect URL (or token); prompted for when omitted
        redirect: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// Show configuration and session status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signed-in user and balances
    Me {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit one decoded receipt QR payload
    Submit {
        /// Decoded QR text
        payload: String,
        /// Receipt image (file or data URL); repeat to offer several cameras
        #[arg(long)]
        capture: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read decoded QR payloads from stdin until one is processed
    Scan {
        /// Receipt image (file or data URL); repeat to offer several cameras
        #[arg(long)]
        capture: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Structured logs on stderr, JSON when RETENTION_LOG_JSON is set
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("retention_core=debug,retention_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if std::env::var_os("RETENTION_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    // These must work even when the API domain is not configured
    match cli.command {
        Commands::Logout => return logout::run(),
        Commands::Config { command } => return config::run(command),
        _ => {}
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Login => login::run(),
            Commands::Auth { redirect } => auth::run(redirect).await,
            Commands::Logout => logout::run(),
            Commands::Config { command } => config::run(command),
            Commands::Status { json } => status::run(json).await,
            Commands::Me { json } => me::run(json).await,
            Commands::Submit { payload, capture, json } => {
                submit::run(&payload, &capture, json).await
            }
            Commands::Scan { capture, json } => scan::run(&capture, json).await,
        }
    })
}
