//! Retention Core - client logic for Retention Chain cashback
//!
//! This crate implements the client following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Receipt, QrPayload, SessionToken, etc.)
//! - **ports**: Trait definitions for external collaborators (CashbackApi, TokenStore, ...)
//! - **services**: Client logic orchestration (auth, receipts, the scan queue)
//! - **adapters**: Concrete implementations (reqwest, token file, capture sources)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::http::HttpCashbackApi;
use adapters::token_store::FileTokenStore;
use config::Config;
use ports::{CashbackApi, Notifier, TokenStore};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    CaptureImage, Notification, NotificationVariant, QrPayload, Receipt, SessionToken, User,
};

/// Main context for client operations
///
/// The root of the client: it holds the configuration and the long-lived
/// services, and builds a fresh `ScanSession` each time scanning starts.
pub struct RetentionContext {
    pub config: Config,
    pub auth_service: Arc<AuthService>,
    pub receipt_service: Arc<ReceiptService>,
    notifier: Arc<dyn Notifier>,
}

impl RetentionContext {
    /// Create a context backed by the HTTP API and the token file
    pub fn new(data_dir: &Path, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let config = Config::load(data_dir)
            .with_context(|| format!("Failed to load settings from {:?}", data_dir))?;

        let api: Arc<dyn CashbackApi> =
            Arc::new(HttpCashbackApi::from_config(&config).context("Failed to create API client")?);
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(data_dir));

        Ok(Self::with_adapters(config, api, tokens, notifier))
    }

    /// Create a context from explicit adapters
    pub fn with_adapters(
        config: Config,
        api: Arc<dyn CashbackApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(Arc::clone(&api), Arc::clone(&tokens)));
        let receipt_service = Arc::new(ReceiptService::new(api, tokens));

        Self {
            config,
            auth_service,
            receipt_service,
            notifier,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.auth_service.is_ready()
    }

    /// Start a new scanning session
    pub fn scan_session(&self) -> ScanSession {
        ScanSession::new(
            Arc::clone(&self.auth_service),
            Arc::clone(&self.receipt_service),
            Arc::clone(&self.notifier),
        )
    }
}
