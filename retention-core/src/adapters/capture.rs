//! Capture source adapters
//!
//! The browser grabs a 1920x1080 JPEG from the live video element. Headless
//! front ends hand over a frame that was already captured, either as an image
//! file or as a data URL.

use std::path::{Path, PathBuf};

use crate::domain::result::Result;
use crate::domain::CaptureImage;
use crate::ports::CaptureSource;

/// File name used for uploaded captures
pub const CAPTURE_FILE_NAME: &str = "capture.jpeg";

/// Frame read from an image file on each capture
#[derive(Debug, Clone)]
pub struct FileCaptureSource {
    path: PathBuf,
    name: String,
}

impl FileCaptureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

impl CaptureSource for FileCaptureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture(&self) -> Result<Option<CaptureImage>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(CaptureImage::new(
                CAPTURE_FILE_NAME,
                mime_for(&self.path),
                bytes,
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Frame handed over as a `data:` URL
#[derive(Debug, Clone)]
pub struct DataUrlCaptureSource {
    data_url: String,
}

impl DataUrlCaptureSource {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }
}

impl CaptureSource for DataUrlCaptureSource {
    fn name(&self) -> &str {
        "data-url"
    }

    fn capture(&self) -> Result<Option<CaptureImage>> {
        Ok(CaptureImage::from_data_url(&self.data_url, CAPTURE_FILE_NAME))
    }
}
