//! Receipt domain model: decoded QR payloads and receipt captures

use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Number of `;`-separated fields in a fiscal receipt QR code
const QR_FIELD_COUNT: usize = 12;

/// Index of the tax field, which carries the amount as `...^<amount>:...`
const QR_TAX_FIELD: usize = 3;

static DATA_URL_MIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(.*?);").expect("valid mime regex"));

/// A receipt registered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
}

/// A validated QR code payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    raw: String,
    amount: String,
}

impl QrPayload {
    /// Parse and validate a decoded QR string
    ///
    /// The payload is kept verbatim for submission; only the amount is
    /// extracted for display.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(';').collect();
        if parts.len() != QR_FIELD_COUNT {
            return Err(Error::validation(format!(
                "Expected {} QR fields, found {}",
                QR_FIELD_COUNT,
                parts.len()
            )));
        }

        let amount = between_last(parts[QR_TAX_FIELD], '^', ':')
            .ok_or_else(|| Error::validation("No amount found in QR payload"))?;

        Ok(Self {
            raw: raw.to_string(),
            amount: amount.to_string(),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// Substring between the last `left` and the last `right`
///
/// A missing `left` counts as the start of the string. Returns `None` when
/// `right` is missing, comes first, or the slice is empty.
fn between_last(source: &str, left: char, right: char) -> Option<&str> {
    let right_idx = source.rfind(right)?;
    let start = match source.rfind(left) {
        Some(left_idx) if left_idx >= right_idx => return None,
        Some(left_idx) => left_idx + left.len_utf8(),
        None => 0,
    };
    let slice = &source[start..right_idx];
    (!slice.is_empty()).then_some(slice)
}

/// A still frame captured from the camera, ready for upload
#[derive(Clone, PartialEq, Eq)]
pub struct CaptureImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl CaptureImage {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Decode a `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(data_url: &str, file_name: &str) -> Option<Self> {
        let (header, payload) = data_url.split_once(',')?;
        let mime = DATA_URL_MIME.captures(header)?.get(1)?.as_str();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .ok()?;
        Some(Self::new(file_name, mime, bytes))
    }
}

impl std::fmt::Debug for CaptureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Bearer token issued by the OAuth flow
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(Error::validation("Session token cannot be empty"));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
