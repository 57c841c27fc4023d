//! Core domain entities
//!
//! All client entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod notification;
mod receipt;
pub mod result;
mod user;

pub use notification::{Notification, NotificationVariant};
pub use receipt::{CaptureImage, QrPayload, Receipt, SessionToken};
pub use user::{JsonBalance, JsonUser, NearAmount, User};
