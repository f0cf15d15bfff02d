//! Screen capture domain — public API.
//!
//! This module owns region geometry, the monitor grab, and the captured
//! PNG payload handed to the uploader. External code should only use the
//! types and functions exported here.

mod region;
mod screenshot;

pub use region::{crop_to_png_bytes, to_png_bytes, Region};
pub use screenshot::capture_primary_monitor;

/// How the user asked for the capture to be framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Interactive region selection before the grab.
    Area,
    /// The entire primary monitor; the host window hides first.
    FullScreen,
}

/// One capture button press. Created by the host, consumed by a single
/// workflow run.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub mode: CaptureMode,
    /// Skip the preview gate and upload immediately after capture.
    pub direct_upload: bool,
    /// Ask the namer for an AI-generated filename before uploading.
    pub ai_naming: bool,
}

impl CaptureRequest {
    pub fn area(direct_upload: bool) -> Self {
        Self {
            mode: CaptureMode::Area,
            direct_upload,
            ai_naming: false,
        }
    }

    pub fn full_screen(direct_upload: bool) -> Self {
        Self {
            mode: CaptureMode::FullScreen,
            direct_upload,
            ai_naming: false,
        }
    }

    pub fn with_ai_naming(mut self) -> Self {
        self.ai_naming = true;
        self
    }
}

/// A captured screenshot: PNG bytes plus pixel dimensions.
///
/// Owned exclusively by the workflow until it is either discarded on
/// cancel or handed to the uploader; retained after a failed upload so
/// the user can retry without recapturing.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_png_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("no primary monitor found")]
    NoPrimaryMonitor,

    #[error("screen grab failed: {0}")]
    Grab(String),

    #[error("selection region has zero width or height")]
    EmptyRegion,

    #[error(
        "crop region ({}) exceeds image bounds ({}x{})",
        requested, image_size.0, image_size.1
    )]
    OutOfBounds {
        requested: Region,
        image_size: (u32, u32),
    },

    #[error("PNG encoding failed: {0}")]
    PngEncoding(String),
}

/// Port producing a [`CapturedImage`] for a region or the whole screen.
///
/// The workflow only knows this trait; [`ScreenCapturer`] is the xcap-backed
/// implementation, tests substitute their own.
pub trait Capturer {
    /// Capture the given region, or the full primary monitor when `None`.
    fn capture(&mut self, region: Option<&Region>) -> Result<CapturedImage, CaptureError>;
}

/// Captures the primary monitor via `xcap` and crops in-process.
#[derive(Debug, Default)]
pub struct ScreenCapturer;

impl ScreenCapturer {
    pub fn new() -> Self {
        Self
    }
}

impl Capturer for ScreenCapturer {
    fn capture(&mut self, region: Option<&Region>) -> Result<CapturedImage, CaptureError> {
        let start = std::time::Instant::now();
        let shot = capture_primary_monitor()?;

        let (bytes, width, height) = match region {
            Some(requested) => {
                let clamped = requested.clamp_to(shot.width(), shot.height());
                let bytes = crop_to_png_bytes(&shot, &clamped)?;
                (bytes, clamped.width, clamped.height)
            }
            None => {
                let bytes = to_png_bytes(&shot)?;
                (bytes, shot.width(), shot.height())
            }
        };

        log::info!(
            "[CAPTURE] {}x{} captured in {}ms — {} bytes",
            width,
            height,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(CapturedImage::new(bytes, width, height))
    }
}
