//! Continuous quality score heuristic
//!
//! Independent of the rule-table label: a region may be labeled spoiled
//! and still score moderately. Adjustments are summed from a 0.5 base and
//! the total is clamped to `[0, 1]` only at the end.

use image::RgbImage;
use serde::Serialize;

use crate::color::{HsvImage, RegionAnalyzer};
use crate::constants::scoring::*;
use crate::error::{GradingError, Result};

/// Individual adjustments behind a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub contrast: f64,
    pub brightness: f64,
    pub saturation: f64,
    pub hue: f64,
    /// Base plus adjustments, before clamping
    pub raw: f64,
    /// Final score in `[0, 1]`
    pub score: f64,
}

/// Scoring heuristic over luminance and HSV means
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer {
    analyzer: RegionAnalyzer,
}

impl QualityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a region
    ///
    /// # Errors
    ///
    /// Returns `EmptyRegion` for a region without pixels; callers substitute
    /// the neutral score.
    pub fn score(&self, region: &RgbImage) -> Result<f64> {
        self.breakdown(region).map(|b| b.score)
    }

    /// Score a region and keep each adjustment
    pub fn breakdown(&self, region: &RgbImage) -> Result<ScoreBreakdown> {
        let empty = || GradingError::EmptyRegion {
            width: region.width(),
            height: region.height(),
        };

        let luma = self.analyzer.luma_stats(region).ok_or_else(empty)?;
        let hsv = HsvImage::from_rgb(region);
        let summary = self.analyzer.summarize(&hsv).ok_or_else(empty)?;

        let contrast = contrast_adjustment(luma.std_dev);
        let brightness = brightness_adjustment(luma.mean);
        let saturation = saturation_adjustment(summary.saturation.mean);
        let hue = hue_adjustment(summary.hue.mean);

        let raw = BASE_SCORE + contrast + brightness + saturation + hue;
        Ok(ScoreBreakdown {
            contrast,
            brightness,
            saturation,
            hue,
            raw,
            score: raw.clamp(0.0, 1.0),
        })
    }
}

/// Luminance standard deviation adjustment
pub fn contrast_adjustment(std_dev: f64) -> f64 {
    if std_dev > HIGH_CONTRAST {
        HIGH_CONTRAST_BONUS
    } else if std_dev > MODERATE_CONTRAST {
        MODERATE_CONTRAST_BONUS
    } else if std_dev < LOW_CONTRAST {
        -LOW_CONTRAST_PENALTY
    } else {
        0.0
    }
}

/// Mean luminance adjustment
pub fn brightness_adjustment(mean: f64) -> f64 {
    let (well_lo, well_hi) = WELL_EXPOSED;
    let (ok_lo, ok_hi) = ACCEPTABLE_EXPOSURE;
    if well_lo < mean && mean < well_hi {
        WELL_EXPOSED_BONUS
    } else if ok_lo < mean && mean < ok_hi {
        ACCEPTABLE_EXPOSURE_BONUS
    } else if mean < UNDEREXPOSED || mean > OVEREXPOSED {
        -EXPOSURE_PENALTY
    } else {
        0.0
    }
}

/// Mean saturation adjustment
pub fn saturation_adjustment(mean: f64) -> f64 {
    if mean > VIVID_SATURATION {
        VIVID_BONUS
    } else if mean < WASHED_OUT_SATURATION {
        -WASHED_OUT_PENALTY
    } else {
        0.0
    }
}

/// Mean hue "fresh color" bonus
pub fn hue_adjustment(mean: f64) -> f64 {
    let (red_below, red_above) = RED_HUE_BOUNDS;
    let (yellow_lo, yellow_hi) = YELLOW_ORANGE_HUE;
    if mean < red_below || mean > red_above {
        RED_HUE_BONUS
    } else if yellow_lo <= mean && mean < yellow_hi {
        YELLOW_ORANGE_HUE_BONUS
    } else {
        0.0
    }
}
