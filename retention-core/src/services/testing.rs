//! Trait-level fakes shared by the service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::result::{Error, Result};
use crate::domain::{CaptureImage, JsonBalance, JsonUser, Receipt, SessionToken};
use crate::ports::{CashbackApi, CaptureSource};

pub const VALID_QR: &str = "t=20240101;s=1;fn=9999;i=VAT^125.50:18;fp=1;n=1;a;b;c;d;e;f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchMe,
    CreateReceipt(String),
    UploadCapture(String, usize),
}

/// In-memory backend with switchable failures
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<Call>>,
    pub reject_receipts: bool,
    pub reject_token: bool,
    pub fail_upload: bool,
    /// When set, `create_receipt` parks until notified
    pub hold_receipts: Option<Notify>,
    pub(crate) receipts: AtomicUsize,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn json_user() -> JsonUser {
    JsonUser {
        id: "user-1".to_string(),
        email: "user@example.com".to_string(),
        name: "Fake User".to_string(),
        avatar_url: "https://example.com/a.png".to_string(),
        balance: JsonBalance {
            pending: "0".to_string(),
            available: "2000000000000000000000".to_string(),
            total: None,
        },
    }
}

#[async_trait]
impl CashbackApi for FakeApi {
    async fn fetch_me(&self, _token: &SessionToken) -> Result<JsonUser> {
        self.record(Call::FetchMe);
        if self.reject_token {
            return Err(Error::unauthenticated("token revoked"));
        }
        Ok(json_user())
    }

    async fn create_receipt(&self, _token: &SessionToken, data: &str) -> Result<Receipt> {
        self.record(Call::CreateReceipt(data.to_string()));
        if let Some(hold) = &self.hold_receipts {
            hold.notified().await;
        }
        if self.reject_receipts {
            return Err(Error::Api {
                status: 409,
                message: "Receipt already scanned".to_string(),
            });
        }
        let n = self.receipts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Receipt {
            id: format!("receipt-{}", n),
        })
    }

    async fn upload_capture(
        &self,
        _token: &SessionToken,
        receipt_id: &str,
        image: &CaptureImage,
    ) -> Result<()> {
        self.record(Call::UploadCapture(receipt_id.to_string(), image.bytes.len()));
        if self.fail_upload {
            return Err(Error::Http("upload failed".to_string()));
        }
        Ok(())
    }
}

/// Capture source returning a fixed frame
pub struct StillFrame(pub Option<Vec<u8>>);

impl CaptureSource for StillFrame {
    fn name(&self) -> &str {
        "still-frame"
    }

    fn capture(&self) -> Result<Option<CaptureImage>> {
        Ok(self
            .0
            .clone()
            .map(|bytes| CaptureImage::new("capture.jpeg", "image/jpeg", bytes)))
    }
}
