//! Region geometry and cropping — functional core.
//!
//! This module has zero infrastructure dependencies.
//! It takes pixel data in, returns pixel data out.

use super::CaptureError;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// A screen-space rectangle in monitor pixels.
///
/// Selection overlays report drag corners in any order (and may overshoot
/// the screen edge); use [`Region::from_corners`] to normalize them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from two drag corners, in any order.
    ///
    /// Coordinates past the left/top screen edge clamp to zero, so a drag
    /// that starts off-screen still yields the visible part.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let left = x1.min(x2).max(0) as u32;
        let top = y1.min(y2).max(0) as u32;
        let right = x1.max(x2).max(0) as u32;
        let bottom = y1.max(y2).max(0) as u32;
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// A zero-area region: a click without a drag. Treated as an aborted
    /// selection by the workflow, never sent to the cropper.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shrink the region to fit inside an image of the given size.
    ///
    /// Returns an empty region if the origin lies outside the image.
    pub fn clamp_to(&self, img_width: u32, img_height: u32) -> Self {
        let x = self.x.min(img_width);
        let y = self.y.min(img_height);
        Self {
            x,
            y,
            width: self.width.min(img_width - x),
            height: self.height.min(img_height - y),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} at {},{}", self.width, self.height, self.x, self.y)
    }
}

/// Crop a screenshot to the given region and return PNG bytes.
///
/// Pure function, no side effects. The region must be non-empty and lie
/// inside the image; callers clamp first.
pub fn crop_to_png_bytes(image: &DynamicImage, region: &Region) -> Result<Vec<u8>, CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }

    let (img_width, img_height) = (image.width(), image.height());
    if region.x + region.width > img_width || region.y + region.height > img_height {
        return Err(CaptureError::OutOfBounds {
            requested: *region,
            image_size: (img_width, img_height),
        });
    }

    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);
    to_png_bytes(&cropped)
}

/// Encode an image as PNG bytes.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>, CaptureError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CaptureError::PngEncoding(e.to_string()))?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    #[test]
    fn from_corners_normalizes_drag_direction() {
        // Right-to-left, bottom-to-top drag
        let r = Region::from_corners(150, 120, 50, 20);
        assert_eq!(r, Region::new(50, 20, 100, 100));
        // Same corners, natural order
        assert_eq!(Region::from_corners(50, 20, 150, 120), r);
    }

    #[test]
    fn from_corners_clamps_offscreen_start() {
        let r = Region::from_corners(-30, -10, 70, 90);
        assert_eq!(r, Region::new(0, 0, 70, 90));
    }

    #[test]
    fn click_without_drag_is_empty() {
        assert!(Region::from_corners(40, 40, 40, 40).is_empty());
        assert!(Region::new(0, 0, 100, 0).is_empty());
        assert!(!Region::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn clamp_shrinks_overshooting_selection() {
        let r = Region::new(80, 90, 50, 50).clamp_to(100, 100);
        assert_eq!(r, Region::new(80, 90, 20, 10));
    }

    #[test]
    fn clamp_outside_image_is_empty() {
        assert!(Region::new(200, 200, 10, 10).clamp_to(100, 100).is_empty());
    }

    #[test]
    fn crop_valid_region() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 100));
        let bytes = crop_to_png_bytes(&img, &Region::new(10, 10, 50, 50)).unwrap();
        // PNG magic bytes
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn crop_empty_region_fails() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 100));
        let result = crop_to_png_bytes(&img, &Region::new(0, 0, 0, 50));
        assert!(matches!(result, Err(CaptureError::EmptyRegion)));
    }

    #[test]
    fn crop_out_of_bounds_fails() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 100));
        let result = crop_to_png_bytes(&img, &Region::new(80, 80, 30, 30));
        assert!(matches!(result, Err(CaptureError::OutOfBounds { .. })));
    }
}
