//! Detection boxes and region construction
//!
//! Regions are plain `image::RgbImage` buffers. Detectors that produce
//! BGR frames can hand their bytes to [`region_from_bgr`].

use image::{GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};

/// Axis-aligned box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Larger side, the measurement used for size bucketing
    pub fn size_px(&self) -> f64 {
        self.width().max(self.height())
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(coords: [f64; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

/// Region from interleaved RGB bytes
///
/// # Errors
///
/// Returns `InvalidRegion` if `data.len() != width * height * 3`.
pub fn region_from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<RgbImage> {
    let expected = width as usize * height as usize * 3;
    let actual = data.len();
    RgbImage::from_raw(width, height, data).filter(|_| actual == expected).ok_or(
        GradingError::InvalidRegion {
            width,
            height,
            expected,
            actual,
        },
    )
}

/// Region from interleaved BGR bytes (OpenCV channel order)
pub fn region_from_bgr(width: u32, height: u32, mut data: Vec<u8>) -> Result<RgbImage> {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
    region_from_rgb(width, height, data)
}

/// Crop a detection box out of a full frame
///
/// Coordinates are truncated to whole pixels and clamped to the frame.
/// Degenerate or out-of-frame boxes yield an empty region.
pub fn crop_region(image: &RgbImage, bbox: &BoundingBox) -> RgbImage {
    let (width, height) = image.dimensions();
    let clamp = |v: f64, limit: u32| -> u32 {
        if v.is_nan() || v <= 0.0 {
            0
        } else {
            (v.trunc() as u64).min(limit as u64) as u32
        }
    };

    let x1 = clamp(bbox.x1, width);
    let y1 = clamp(bbox.y1, height);
    let x2 = clamp(bbox.x2, width);
    let y2 = clamp(bbox.y2, height);

    if x2 <= x1 || y2 <= y1 {
        return RgbImage::new(0, 0);
    }

    image.view(x1, y1, x2 - x1, y2 - y1).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_bbox_geometry() {
        let bbox = BoundingBox::new(10.0, 20.0, 50.0, 45.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 25.0);
        assert_eq!(bbox.area(), 1000.0);
        assert_eq!(bbox.size_px(), 40.0);
        assert_eq!(BoundingBox::from([10.0, 20.0, 50.0, 45.0]), bbox);
    }

    #[test]
    fn test_region_from_rgb_checks_length() {
        assert!(region_from_rgb(2, 2, vec![0; 12]).is_ok());
        let err = region_from_rgb(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(err, GradingError::InvalidRegion { expected: 12, actual: 11, .. }));
        assert!(region_from_rgb(1, 1, vec![0; 4]).is_err());
    }

    #[test]
    fn test_region_from_bgr_swaps_channels() {
        let region = region_from_bgr(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        assert_eq!(region.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(region.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_crop_region() {
        let image = RgbImage::from_fn(10, 10, |x, y| Rgb([x as u8, y as u8, 0]));
        let crop = crop_region(&image, &BoundingBox::new(2.7, 3.2, 6.9, 8.0));
        assert_eq!(crop.dimensions(), (4, 5));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([2, 3, 0]));
    }

    #[test]
    fn test_crop_region_clamps_to_frame() {
        let image = RgbImage::new(10, 10);
        let crop = crop_region(&image, &BoundingBox::new(-5.0, 8.0, 30.0, 40.0));
        assert_eq!(crop.dimensions(), (10, 2));
    }

    #[test]
    fn test_degenerate_crop_is_empty() {
        let image = RgbImage::new(10, 10);
        assert_eq!(crop_region(&image, &BoundingBox::new(5.0, 5.0, 5.0, 9.0)).dimensions(), (0, 0));
        assert_eq!(crop_region(&image, &BoundingBox::new(12.0, 0.0, 20.0, 5.0)).dimensions(), (0, 0));
        assert_eq!(
            crop_region(&image, &BoundingBox::new(f64::NAN, 0.0, 4.0, 4.0)).dimensions(),
            (4, 4)
        );
    }
}
