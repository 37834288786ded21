//! Color space conversion utilities
//!
//! Provides the conversions the grading engine relies on:
//! - RGB to 8-bit HSV (hue in `0..=179`, OpenCV fixed-point rounding)
//! - RGB to BT.601 luminance (8-bit fixed point)
//! - sRGB to hexadecimal strings for display colors
//!
//! The rule table and scoring thresholds were calibrated against these
//! exact integer conversions, so floating-point shortcuts are avoided.

use image::RgbImage;
use palette::Srgb;

use crate::constants::hsv::{FIXED_POINT_SHIFT, HUE_PERIOD};
use crate::error::{GradingError, Result};

const ROUND_HALF: i32 = 1 << (FIXED_POINT_SHIFT - 1);

/// BT.601 luminance weights scaled by 2^14
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Region converted to 8-bit HSV, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl HsvImage {
    /// Convert an RGB region to HSV
    pub fn from_rgb(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| ColorConverter::rgb_to_hsv(p[0], p[1], p[2]))
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// Build directly from HSV triples
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegion` if the pixel count does not match `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GradingError::InvalidRegion {
                width,
                height,
                expected: expected * 3,
                actual: pixels.len() * 3,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Uniform image, mostly useful for tests and calibration
    pub fn filled(width: u32, height: u32, hsv: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![hsv; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }
}

/// Color converter for the grading pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert one RGB pixel to 8-bit HSV
    ///
    /// Hue is halved to fit `0..=179`; saturation and value span `0..=255`.
    /// Ties on the maximum channel resolve red first, then green.
    pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let v = r.max(g).max(b);
        let vmin = r.min(g).min(b);
        let diff = v - vmin;

        let s = (diff * saturation_divisor(v) + ROUND_HALF) >> FIXED_POINT_SHIFT;

        let raw_hue = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let mut h = (raw_hue * hue_divisor(diff) + ROUND_HALF) >> FIXED_POINT_SHIFT;
        if h < 0 {
            h += HUE_PERIOD;
        }

        [h as u8, s as u8, v as u8]
    }

    /// BT.601 luminance of one RGB pixel, rounded to 8 bits
    #[inline]
    pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
        let y = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
        ((y + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
    }

    /// Convert sRGB to hexadecimal color string
    pub fn srgb_to_hex(&self, srgb: Srgb<u8>) -> String {
        format!("#{:02X}{:02X}{:02X}", srgb.red, srgb.green, srgb.blue)
    }

    /// Parse hexadecimal color string to sRGB
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the string is not six hex digits
    /// (with or without a leading `#`).
    pub fn hex_to_srgb(&self, hex: &str) -> Result<Srgb<u8>> {
        let digits = hex.trim_start_matches('#');
        let invalid = || GradingError::InvalidParameter {
            parameter: "hex".to_string(),
            value: hex.to_string(),
        };
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

fn saturation_divisor(v: i32) -> i32 {
    if v == 0 {
        0
    } else {
        ((255 << FIXED_POINT_SHIFT) as f64 / v as f64).round() as i32
    }
}

fn hue_divisor(diff: i32) -> i32 {
    if diff == 0 {
        0
    } else {
        ((HUE_PERIOD << FIXED_POINT_SHIFT) as f64 / (6.0 * diff as f64)).round() as i32
    }
}
