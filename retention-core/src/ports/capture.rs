//! Camera port

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::CaptureImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// A media device as enumerated by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraDevice {
    pub device_id: String,
    pub label: String,
    pub kind: DeviceKind,
}

/// The active video element frames are captured from
///
/// Exactly one source is attached at a time; it is released when scanning
/// stops.
pub trait CaptureSource: Send + Sync {
    /// Human readable name for logs
    fn name(&self) -> &str;

    /// Grab the current frame, `None` if no frame is available
    fn capture(&self) -> Result<Option<CaptureImage>>;
}
