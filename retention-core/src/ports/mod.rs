//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators: the REST backend,
//! client-local token storage, the camera and the notification surface. The
//! services depend only on these traits, not on concrete implementations.

mod api;
mod capture;
mod notifier;
mod token_store;

pub use api::CashbackApi;
pub use capture::{CameraDevice, CaptureSource, DeviceKind};
pub use notifier::Notifier;
pub use token_store::TokenStore;
