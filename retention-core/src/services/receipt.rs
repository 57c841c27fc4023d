//! Receipt service - submit scanned receipts and upload their captures

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{Receipt, SessionToken};
use crate::ports::{CashbackApi, CaptureSource, TokenStore};

/// Receipt service for the scan pipeline
pub struct ReceiptService {
    api: Arc<dyn CashbackApi>,
    tokens: Arc<dyn TokenStore>,
    capture_source: Mutex<Option<Arc<dyn CaptureSource>>>,
}

impl ReceiptService {
    pub fn new(api: Arc<dyn CashbackApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            capture_source: Mutex::new(None),
        }
    }

    fn source_slot(&self) -> MutexGuard<'_, Option<Arc<dyn CaptureSource>>> {
        self.capture_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn require_token(&self) -> Result<SessionToken> {
        self.tokens
            .load()?
            .ok_or_else(|| Error::unauthenticated("No token for fetching"))
    }

    /// Submit a decoded QR payload as a new receipt
    pub async fn process_receipt(&self, data: &str) -> Result<Receipt> {
        let token = self.require_token()?;
        let receipt = self.api.create_receipt(&token, data).await?;
        info!(receipt_id = %receipt.id, "receipt created");
        Ok(receipt)
    }

    /// Capture the current camera frame and attach it to `receipt`
    ///
    /// Does nothing when no camera is attached or it has no frame.
    pub async fn save_and_upload_capture(&self, receipt: &Receipt) -> Result<()> {
        let source = self.source_slot().clone();
        let Some(source) = source else {
            debug!("no capture source attached, skipping capture upload");
            return Ok(());
        };

        let Some(image) = source.capture()? else {
            debug!(source = source.name(), "capture source produced no frame");
            return Ok(());
        };

        let token = self.require_token()?;
        self.api.upload_capture(&token, &receipt.id, &image).await?;
        info!(receipt_id = %receipt.id, bytes = image.bytes.len(), "capture uploaded");
        Ok(())
    }

    /// Attach the active camera, replacing any previous one
    pub fn set_capture_source(&self, source: Arc<dyn CaptureSource>) {
        debug!(source = source.name(), "capture source attached");
        *self.source_slot() = Some(source);
    }

    /// Release `source` if it is still the active camera
    ///
    /// A camera attached later by someone else stays in place. Returns
    /// whether `source` was released.
    pub fn release_capture_source(&self, source: &Arc<dyn CaptureSource>) -> bool {
        let mut slot = self.source_slot();
        let owned = slot
            .as_ref()
            .is_some_and(|active| std::ptr::addr_eq(Arc::as_ptr(active), Arc::as_ptr(source)));
        if owned {
            *slot = None;
            debug!(source = source.name(), "capture source released");
        }
        owned
    }

    pub fn has_capture_source(&self) -> bool {
        self.source_slot().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::token_store::MemoryTokenStore;
    use crate::services::testing::{Call, FakeApi, StillFrame};

    fn service(token: Option<&str>) -> (ReceiptService, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::default());
        let tokens = match token {
            Some(t) => MemoryTokenStore::with_token(SessionToken::new(t).unwrap()),
            None => MemoryTokenStore::new(),
        };
        (ReceiptService::new(api.clone(), Arc::new(tokens)), api)
    }

    #[tokio::test]
    async fn test_process_requires_token() {
        let (receipts, api) = service(None);
        let result = receipts.process_receipt("payload").await;
        assert!(matches!(result, Err(Error::Unauthenticated(_))));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_process_submits_payload() {
        let (receipts, api) = service(Some("tok"));
        let receipt = receipts.process_receipt("payload").await.unwrap();
        assert_eq!(receipt.id, "receipt-1");
        assert_eq!(api.calls(), vec![Call::CreateReceipt("payload".to_string())]);
    }

    #[tokio::test]
    async fn test_upload_without_source_is_noop() {
        let (receipts, api) = service(Some("tok"));
        let receipt = Receipt { id: "r".to_string() };
        receipts.save_and_upload_capture(&receipt).await.unwrap();

        receipts.set_capture_source(Arc::new(StillFrame(None)));
        receipts.save_and_upload_capture(&receipt).await.unwrap();
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_capture() {
        let (receipts, api) = service(Some("tok"));
        let source: Arc<dyn CaptureSource> = Arc::new(StillFrame(Some(vec![1, 2, 3])));
        receipts.set_capture_source(Arc::clone(&source));

        let receipt = Receipt { id: "r-7".to_string() };
        receipts.save_and_upload_capture(&receipt).await.unwrap();
        assert_eq!(api.calls(), vec![Call::UploadCapture("r-7".to_string(), 3)]);

        assert!(receipts.release_capture_source(&source));
        assert!(!receipts.has_capture_source());
    }

    #[test]
    fn test_release_keeps_newer_source() {
        let (receipts, _api) = service(Some("tok"));
        let old: Arc<dyn CaptureSource> = Arc::new(StillFrame(None));
        let new: Arc<dyn CaptureSource> = Arc::new(StillFrame(Some(vec![1])));

        receipts.set_capture_source(Arc::clone(&old));
        receipts.set_capture_source(Arc::clone(&new));

        assert!(!receipts.release_capture_source(&old));
        assert!(receipts.has_capture_source());
        assert!(receipts.release_capture_source(&new));
        assert!(!receipts.has_capture_source());
    }
}
