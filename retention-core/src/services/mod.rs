//! Service layer - client logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
pub mod camera;
mod receipt;
pub mod scan_queue;
pub mod scan_session;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{parse_redirect, AuthService};
pub use camera::{scan_interval, select_camera, ScanRegion};
pub use receipt::ReceiptService;
pub use scan_queue::{QueueError, QueueId, ScanQueue};
pub use scan_session::{ScanOutcome, ScanSession, ScanState};
