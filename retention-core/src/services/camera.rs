//! Camera helpers - device choice, scan region and decode pacing

use std::time::Duration;

use serde::Serialize;

use crate::config::ScannerSettings;
use crate::domain::result::{Error, Result};
use crate::ports::{CameraDevice, DeviceKind};

/// Side of the downscaled region handed to the decoder
const DOWNSCALED_SIDE: u32 = 400;

/// Pick the camera to scan with
///
/// Phones list the front camera first, so the second video input is
/// preferred when there is one.
pub fn select_camera(devices: &[CameraDevice]) -> Result<&CameraDevice> {
    let video: Vec<&CameraDevice> = devices
        .iter()
        .filter(|d| d.kind == DeviceKind::VideoInput)
        .collect();

    video
        .get(1)
        .or_else(|| video.first())
        .copied()
        .ok_or_else(|| Error::NoCamera("No video devices found".to_string()))
}

/// Region of the frame the decoder looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub downscaled_width: u32,
    pub downscaled_height: u32,
}

impl ScanRegion {
    /// Centered square, a quarter of the shorter frame side
    pub fn centered(video_width: u32, video_height: u32) -> Self {
        let side = video_width.min(video_height) / 4;
        Self {
            x: (video_width - side) / 2,
            y: (video_height - side) / 2,
            width: side,
            height: side,
            downscaled_width: DOWNSCALED_SIDE,
            downscaled_height: DOWNSCALED_SIDE,
        }
    }
}

/// Minimum spacing between decode attempts
pub fn scan_interval(settings: &ScannerSettings) -> Duration {
    Duration::from_secs(1) / settings.max_scans_per_second.max(1)
}
