//! Pixel statistics over HSV and luminance channels
//!
//! Summaries feed the hue-average fallback, the quality score heuristic,
//! and the diagnostics emitted by the matcher.

use image::RgbImage;
use serde::Serialize;

use crate::color::conversion::{ColorConverter, HsvImage};
use crate::constants::hue_filter;

/// Min / max / mean of one 8-bit channel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelStats {
    pub min: u8,
    pub max: u8,
    pub mean: f64,
}

/// Per-channel statistics of an HSV region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HsvSummary {
    pub hue: ChannelStats,
    pub saturation: ChannelStats,
    pub value: ChannelStats,
    pub pixel_count: usize,
}

impl HsvSummary {
    /// Short color description of the mean HSV, e.g. "red vivid normal"
    pub fn describe(&self) -> String {
        describe_hsv(self.hue.mean, self.saturation.mean, self.value.mean)
    }
}

/// Mean and population standard deviation of luminance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LumaStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Statistics extractor for grading regions
#[derive(Debug, Clone, Copy)]
pub struct RegionAnalyzer {
    min_saturation: u8,
    min_value: u8,
    max_value: u8,
}

impl Default for RegionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionAnalyzer {
    /// Create an analyzer with the standard valid-hue pixel filter
    pub fn new() -> Self {
        Self {
            min_saturation: hue_filter::MIN_SATURATION,
            min_value: hue_filter::MIN_VALUE,
            max_value: hue_filter::MAX_VALUE,
        }
    }

    /// Create an analyzer with a custom valid-hue pixel filter
    pub fn with_params(min_saturation: u8, min_value: u8, max_value: u8) -> Self {
        Self {
            min_saturation,
            min_value,
            max_value,
        }
    }

    /// Per-channel min/max/mean, `None` for an empty region
    pub fn summarize(&self, hsv: &HsvImage) -> Option<HsvSummary> {
        if hsv.is_empty() {
            return None;
        }

        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        let mut sum = [0u64; 3];
        for pixel in hsv.pixels() {
            for channel in 0..3 {
                min[channel] = min[channel].min(pixel[channel]);
                max[channel] = max[channel].max(pixel[channel]);
                sum[channel] += pixel[channel] as u64;
            }
        }

        let count = hsv.pixel_count();
        let stats = |channel: usize| ChannelStats {
            min: min[channel],
            max: max[channel],
            mean: sum[channel] as f64 / count as f64,
        };

        Some(HsvSummary {
            hue: stats(0),
            saturation: stats(1),
            value: stats(2),
            pixel_count: count,
        })
    }

    /// Whether a pixel carries a reliable hue
    ///
    /// Excludes near-black, near-white and desaturated pixels.
    #[inline]
    pub fn is_valid_hue_pixel(&self, pixel: &[u8; 3]) -> bool {
        pixel[1] > self.min_saturation && pixel[2] > self.min_value && pixel[2] < self.max_value
    }

    /// Mean hue over valid pixels, or over all pixels when none qualify
    ///
    /// Returns `None` only for an empty region.
    pub fn mean_valid_hue(&self, hsv: &HsvImage) -> Option<f64> {
        if hsv.is_empty() {
            return None;
        }

        let (sum, count) = hsv
            .pixels()
            .iter()
            .filter(|p| self.is_valid_hue_pixel(p))
            .fold((0u64, 0usize), |(sum, count), p| (sum + p[0] as u64, count + 1));

        if count > 0 {
            Some(sum as f64 / count as f64)
        } else {
            Some(mean_hue(hsv))
        }
    }

    /// Luminance mean and population standard deviation, `None` when empty
    pub fn luma_stats(&self, image: &RgbImage) -> Option<LumaStats> {
        let count = image.width() as usize * image.height() as usize;
        if count == 0 {
            return None;
        }

        let (sum, sum_sq) = image.pixels().fold((0u64, 0u64), |(sum, sum_sq), p| {
            let y = ColorConverter::rgb_to_luma(p[0], p[1], p[2]) as u64;
            (sum + y, sum_sq + y * y)
        });

        let mean = sum as f64 / count as f64;
        let variance = (sum_sq as f64 / count as f64 - mean * mean).max(0.0);

        Some(LumaStats {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

fn mean_hue(hsv: &HsvImage) -> f64 {
    let sum: u64 = hsv.pixels().iter().map(|p| p[0] as u64).sum();
    sum as f64 / hsv.pixel_count() as f64
}

/// Describe an HSV triple in words (hue name, saturation, brightness)
pub fn describe_hsv(h: f64, s: f64, v: f64) -> String {
    let hue = if !(15.0..=165.0).contains(&h) {
        "red"
    } else if h < 25.0 {
        "orange"
    } else if h < 35.0 {
        "yellow-orange"
    } else if h < 45.0 {
        "yellow"
    } else if h < 75.0 {
        "green"
    } else if h < 105.0 {
        "blue"
    } else if h < 135.0 {
        "purple"
    } else {
        "pink"
    };

    let saturation = if s < 30.0 {
        "pale"
    } else if s < 100.0 {
        "moderate"
    } else if s < 180.0 {
        "deep"
    } else {
        "vivid"
    };

    let brightness = if v < 50.0 {
        "dark"
    } else if v < 150.0 {
        "normal"
    } else if v < 200.0 {
        "bright"
    } else {
        "very bright"
    };

    format!("{} {} {}", hue, saturation, brightness)
}
