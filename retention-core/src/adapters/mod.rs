//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the CashbackApi port
//! - File and in-memory TokenStore
//! - Image file and data URL CaptureSource
//! - Bounded in-memory Notifier that also logs

pub mod capture;
pub mod http;
pub mod notifications;
pub mod token_store;

#[cfg(test)]
pub mod mock_backend;
