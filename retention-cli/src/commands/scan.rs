//! Scan command - feed decoded QR payloads from stdin into a scan session
//!
//! Each line is one decode event. Events are paced like camera frames and
//! may overlap; the session's queue lets only the first valid receipt
//! through and cancels the rest.

use std::sync::Arc;

use anyhow::{Context, Result};
use retention_core::services::{scan_interval, ScanOutcome, ScanRegion, ScanState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::debug;

use super::{attach_cameras, get_context, get_quiet_context, report_outcome};
use crate::output;

pub async fn run(captures: &[String], json: bool) -> Result<()> {
    let (ctx, notifications) = if json {
        let (ctx, recent) = get_quiet_context()?;
        (ctx, Some(recent))
    } else {
        (get_context()?, None)
    };

    let scanner = &ctx.config.scanner;
    let region = ScanRegion::centered(scanner.capture_width, scanner.capture_height);
    debug!(?region, "scan region");

    let session = Arc::new(ctx.scan_session());
    session.start_scanning();
    attach_cameras(&session, captures)?;
    session.on_scan_start();

    if !json && atty::is(atty::Stream::Stdin) {
        output::info("Paste decoded QR codes, one per line (Ctrl-D to stop)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pace = tokio::time::interval(scan_interval(scanner));
    let mut tasks: JoinSet<ScanOutcome> = JoinSet::new();
    let mut outcome = None;

    while session.state() == ScanState::Scanning {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                pace.tick().await;
                let payload = line.trim().to_string();
                if payload.is_empty() {
                    session.on_scan_error("No QR code found");
                    continue;
                }
                let session = Arc::clone(&session);
                tasks.spawn(async move { session.on_scan_result(&payload).await });
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                let result = joined.context("Scan task failed")?;
                if is_final(&result) {
                    outcome = Some(result);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.on_scan_stop("Scanning interrupted");
            }
        }
    }

    // Input ended with scans still in flight
    while let Some(joined) = tasks.join_next().await {
        let result = joined.context("Scan task failed")?;
        if outcome.is_none() && is_final(&result) {
            outcome = Some(result);
        }
    }

    if session.state() != ScanState::Idle {
        session.stop_scanning();
    }

    match outcome {
        Some(outcome) => report_outcome(&outcome, notifications.as_deref(), json),
        None => report_outcome(&ScanOutcome::Cancelled, notifications.as_deref(), json),
    }
}

fn is_final(outcome: &ScanOutcome) -> bool {
    matches!(outcome, ScanOutcome::Processed(_) | ScanOutcome::Failed(_))
}
