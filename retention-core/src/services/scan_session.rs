//! Scan session - camera lifecycle gating for the scan pipeline
//!
//! A session owns its `ScanQueue`. The queue starts blocked and opens when
//! the camera reports that it started; decode events that arrive before that
//! (or after the session stopped) are dropped at registration.
//!
//! The first valid payload to get its turn is processed end to end. Whatever
//! the outcome, scanning then stops: the queue is blocked and flushed, which
//! cancels every decode event still waiting behind it, and the camera is
//! released.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Notification, QrPayload, Receipt};
use crate::ports::{CaptureSource, Notifier};
use crate::services::scan_queue::ScanQueue;
use crate::services::{AuthService, ReceiptService};

pub const MSG_PROCESSED: &str = "QR was successfully processed";
pub const MSG_ALREADY_SCANNED: &str = "Probably QR was already scanned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// Camera off
    Idle,
    /// Camera requested, not yet delivering frames
    Preparing,
    /// Camera live, decode events accepted
    Scanning,
}

/// What happened to one decode event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Not a receipt QR code; scanning continues
    Ignored,
    /// Queue blocked or flushed before this event got its turn
    Cancelled,
    /// Receipt accepted by the backend
    Processed(Receipt),
    /// Backend refused the receipt or could not be reached
    Failed(String),
}

/// One scanning session, from camera start to stop
pub struct ScanSession {
    queue: ScanQueue,
    auth: Arc<AuthService>,
    receipts: Arc<ReceiptService>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ScanState>,
    /// Camera this session handed to the receipt pipeline
    camera: Mutex<Option<Arc<dyn CaptureSource>>>,
}

impl ScanSession {
    pub fn new(
        auth: Arc<AuthService>,
        receipts: Arc<ReceiptService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue: ScanQueue::blocked(),
            auth,
            receipts,
            notifier,
            state: Mutex::new(ScanState::Idle),
            camera: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ScanState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn queue(&self) -> &ScanQueue {
        &self.queue
    }

    /// User asked to scan; the camera is being prepared
    pub fn start_scanning(&self) {
        self.set_state(ScanState::Preparing);
    }

    /// Hand the live camera to the receipt pipeline
    pub fn attach_capture_source(&self, source: Arc<dyn CaptureSource>) {
        self.receipts.set_capture_source(Arc::clone(&source));
        *self.camera.lock().unwrap_or_else(PoisonError::into_inner) = Some(source);
    }

    /// Release the camera this session attached, if it is still active
    fn release_camera(&self) {
        let camera = self.camera.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(camera) = camera {
            self.receipts.release_capture_source(&camera);
        }
    }

    /// Camera started delivering frames
    pub fn on_scan_start(&self) {
        info!("scanner started");
        self.queue.unblock();
        self.set_state(ScanState::Scanning);
    }

    /// A QR code was decoded
    pub async fn on_scan_result(&self, payload: &str) -> ScanOutcome {
        if let Err(e) = QrPayload::parse(payload) {
            debug!(error = %e, "decoded QR is not a receipt, scanning continues");
            return ScanOutcome::Ignored;
        }

        let turn = match self.queue.register() {
            Ok(id) => self.queue.wait_turn(id).await,
            Err(e) => Err(e),
        };
        if let Err(e) = turn {
            debug!(error = %e, "scan result no longer needed");
            return ScanOutcome::Cancelled;
        }

        let outcome = self.process(payload).await;

        self.stop_scanning();
        outcome
    }

    async fn process(&self, payload: &str) -> ScanOutcome {
        let receipt = match self.receipts.process_receipt(payload).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(error = %e, "receipt was not accepted");
                self.notifier.notify(Notification::error(MSG_ALREADY_SCANNED));
                return ScanOutcome::Failed(e.to_string());
            }
        };

        if let Err(e) = self.receipts.save_and_upload_capture(&receipt).await {
            warn!(receipt_id = %receipt.id, error = %e, "capture upload failed");
        }

        self.notifier.notify(Notification::success(MSG_PROCESSED));

        if let Err(e) = self.auth.fetch_user_data().await {
            warn!(error = %e, "failed to refresh balances");
        }

        ScanOutcome::Processed(receipt)
    }

    /// Decoder could not find a QR code in the frame
    pub fn on_scan_error(&self, error: &str) {
        debug!(error, "frame not decoded");
    }

    /// Camera stopped on its own, e.g. permission denied
    pub fn on_scan_stop(&self, reason: &str) {
        warn!(reason, "scanner stopped");
        self.notifier.notify(Notification::error(reason));
        self.stop_scanning();
    }

    /// Turn the camera off and cancel everything still queued
    pub fn stop_scanning(&self) {
        self.set_state(ScanState::Idle);
        self.queue.block();
        self.queue.stop_and_flush();
        self.release_camera();
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.release_camera();
    }
}
