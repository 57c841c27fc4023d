//! Cashback backend port

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{CaptureImage, JsonUser, Receipt, SessionToken};

/// REST backend abstraction
///
/// Every call is authenticated with the bearer token passed in. Adapters map
/// HTTP 401 to `Error::Unauthenticated` and other non-2xx statuses to
/// `Error::Api`.
#[async_trait]
pub trait CashbackApi: Send + Sync {
    /// `GET /user/me`
    async fn fetch_me(&self, token: &SessionToken) -> Result<JsonUser>;

    /// `POST /receipt` with the raw QR payload
    async fn create_receipt(&self, token: &SessionToken, data: &str) -> Result<Receipt>;

    /// `POST /receipt/capture` (multipart: `receipt_id`, `file`)
    async fn upload_capture(
        &self,
        token: &SessionToken,
        receipt_id: &str,
        image: &CaptureImage,
    ) -> Result<()>;
}
