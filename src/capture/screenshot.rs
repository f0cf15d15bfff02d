//! Full-screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer — it talks to the OS.
//! Everything downstream (cropping, encoding) works on the returned image.

use super::CaptureError;
use image::DynamicImage;
use xcap::Monitor;

/// Captures the primary monitor's screen as a `DynamicImage`.
///
/// Returns the full-screen screenshot including all pixels.
/// The caller crops to the user's selection where one exists.
pub fn capture_primary_monitor() -> Result<DynamicImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    let primary = monitors
        .into_iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| {
            // Fallback: if no monitor reports as primary, use the first one
            let all = Monitor::all().ok()?;
            all.into_iter().next()
        })
        .ok_or(CaptureError::NoPrimaryMonitor)?;

    let image = primary
        .capture_image()
        .map_err(|e| CaptureError::Grab(e.to_string()))?;

    log::debug!(
        "[CAPTURE] Monitor grab: {}x{}",
        image.width(),
        image.height()
    );

    Ok(DynamicImage::ImageRgba8(image))
}
