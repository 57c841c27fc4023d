//! CLI command implementations

pub mod auth;
pub mod config;
pub mod login;
pub mod logout;
pub mod me;
pub mod scan;
pub mod status;
pub mod submit;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use retention_core::adapters::capture::{DataUrlCaptureSource, FileCaptureSource};
use retention_core::adapters::notifications::RecentNotifications;
use retention_core::config::Config;
use retention_core::ports::{CameraDevice, CaptureSource, DeviceKind, Notifier};
use retention_core::services::{select_camera, ScanOutcome, ScanSession};
use retention_core::{OperationResult, RetentionContext};

use crate::output::{self, TerminalNotifier};

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RETENTION_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".retention"))
        .context("Could not find home directory; set RETENTION_DIR")
}

/// Get a context that reports notifications on the terminal
pub fn get_context() -> Result<RetentionContext> {
    context_with(Arc::new(TerminalNotifier))
}

/// Get a context that collects notifications for JSON output
pub fn get_quiet_context() -> Result<(RetentionContext, Arc<RecentNotifications>)> {
    let config = Config::load(&get_data_dir()?)?;
    let recent = Arc::new(RecentNotifications::from_settings(&config.notifications));
    let ctx = context_with(recent.clone())?;
    Ok((ctx, recent))
}

fn context_with(notifier: Arc<dyn Notifier>) -> Result<RetentionContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    RetentionContext::new(&data_dir, notifier).context("Failed to initialize client")
}

/// Offer every `--capture` input to the session as a camera
///
/// Inputs are listed in the order given; the usual camera choice applies, so
/// with two or more the second one is used.
pub fn attach_cameras(session: &ScanSession, captures: &[String]) -> Result<()> {
    if let Some(source) = capture_source(captures)? {
        session.attach_capture_source(source);
    }
    Ok(())
}

fn capture_source(captures: &[String]) -> Result<Option<Arc<dyn CaptureSource>>> {
    if captures.is_empty() {
        return Ok(None);
    }

    let devices: Vec<CameraDevice> = captures
        .iter()
        .enumerate()
        .map(|(i, capture)| CameraDevice {
            device_id: capture.clone(),
            label: format!("capture {}", i + 1),
            kind: DeviceKind::VideoInput,
        })
        .collect();
    let camera = select_camera(&devices)?;
    tracing::debug!(camera = %camera.label, "camera selected");

    let source: Arc<dyn CaptureSource> = if camera.device_id.starts_with("data:") {
        Arc::new(DataUrlCaptureSource::new(camera.device_id.as_str()))
    } else {
        Arc::new(FileCaptureSource::new(camera.device_id.as_str()))
    };
    Ok(Some(source))
}

/// Print what happened to a scan, with any notifications collected on the way
pub fn report_outcome(
    outcome: &ScanOutcome,
    notifications: Option<&RecentNotifications>,
    json: bool,
) -> Result<()> {
    if json {
        let (status, result) = match outcome {
            ScanOutcome::Processed(receipt) => ("processed", OperationResult::ok(receipt.clone())),
            ScanOutcome::Failed(e) => ("failed", OperationResult::fail(e.as_str())),
            ScanOutcome::Cancelled => ("cancelled", OperationResult::fail("Scan cancelled")),
            ScanOutcome::Ignored => ("ignored", OperationResult::fail("Not a receipt QR code")),
        };
        let visible = notifications.map(|n| n.visible()).unwrap_or_default();
        let result = result
            .with_context("status", serde_json::json!(status))
            .with_context("notifications", serde_json::to_value(visible)?);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match outcome {
        ScanOutcome::Processed(receipt) => output::info(&format!("Receipt id: {}", receipt.id)),
        ScanOutcome::Failed(e) => anyhow::bail!("Scan failed: {}", e),
        ScanOutcome::Cancelled => output::warning("Scan cancelled"),
        ScanOutcome::Ignored => anyhow::bail!("Not a receipt QR code"),
    }
    Ok(())
}
