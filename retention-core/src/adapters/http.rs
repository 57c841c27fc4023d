//! Cashback REST API client
//!
//! Handles communication with the cashback backend: the user profile,
//! receipt submission and receipt capture uploads. All requests carry the
//! session token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{CaptureImage, JsonUser, Receipt, SessionToken};
use crate::ports::CashbackApi;

#[derive(Debug, Serialize)]
struct CreateReceiptRequest<'a> {
    data: &'a str,
}

/// HTTP implementation of the cashback backend port
#[derive(Debug, Clone)]
pub struct HttpCashbackApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpCashbackApi {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url()?, config.request_timeout)
    }

    /// Create a client for the given base URL
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Http(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::Http(format!("Unable to connect to {}", self.base_url))
        } else if error.is_decode() {
            Error::Http(format!("Unexpected response body: {}", error))
        } else {
            Error::Http(format!("Request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        match status {
            StatusCode::UNAUTHORIZED => Err(Error::unauthenticated(format!(
                "Session expired or invalid: {}",
                message
            ))),
            status => Err(Error::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

/// Pull `message` or `error` out of a JSON error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl CashbackApi for HttpCashbackApi {
    async fn fetch_me(&self, token: &SessionToken) -> Result<JsonUser> {
        let response = self
            .client
            .get(self.endpoint("/user/me")?)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_response_status(response).await?;

        response
            .json::<JsonUser>()
            .await
            .map_err(|e| self.map_request_error(e))
    }

    async fn create_receipt(&self, token: &SessionToken, data: &str) -> Result<Receipt> {
        let response = self
            .client
            .post(self.endpoint("/receipt")?)
            .bearer_auth(token.expose())
            .json(&CreateReceiptRequest { data })
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_response_status(response).await?;

        response
            .json::<Receipt>()
            .await
            .map_err(|e| self.map_request_error(e))
    }

    async fn upload_capture(
        &self,
        token: &SessionToken,
        receipt_id: &str,
        image: &CaptureImage,
    ) -> Result<()> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)
            .map_err(|e| Error::validation(format!("Invalid capture MIME type: {}", e)))?;

        let form = Form::new()
            .text("receipt_id", receipt_id.to_string())
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint("/receipt/capture")?)
            .bearer_auth(token.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        Self::check_response_status(response).await?;
        Ok(())
    }
}
