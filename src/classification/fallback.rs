//! Hue-average fallback classifier
//!
//! Used when no rule-table label clears the confidence threshold. The
//! mean hue of pixels with reliable hue information is mapped through a
//! per-category band table; the first band that contains it wins and any
//! remaining hue is treated as spoiled.

use crate::color::{HsvImage, RegionAnalyzer};
use crate::error::{GradingError, Result};
use crate::rules::{ProductCategory, QualityLabel};

/// One interval over the mean hue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HueBand {
    /// `h < bound`
    Below(f64),
    /// `h > bound`
    Above(f64),
    /// `lo <= h < hi`
    Between(f64, f64),
}

impl HueBand {
    pub fn contains(&self, hue: f64) -> bool {
        match *self {
            HueBand::Below(bound) => hue < bound,
            HueBand::Above(bound) => hue > bound,
            HueBand::Between(lo, hi) => lo <= hue && hue < hi,
        }
    }
}

/// Bands mapping to one label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRule {
    pub label: QualityLabel,
    pub bands: &'static [HueBand],
}

/// Ordered band table of one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueProfile {
    pub rules: &'static [BandRule],
    /// Label for hues no band covers
    pub otherwise: QualityLabel,
}

impl HueProfile {
    /// Label for a mean hue, first matching rule wins
    pub fn classify(&self, hue: f64) -> QualityLabel {
        self.rules
            .iter()
            .find(|rule| rule.bands.iter().any(|band| band.contains(hue)))
            .map(|rule| rule.label)
            .unwrap_or(self.otherwise)
    }
}

const GREEN: HueBand = HueBand::Between(35.0, 85.0);

/// Apple and tomato ripen to red
static RED_RIPENING: HueProfile = HueProfile {
    rules: &[
        BandRule {
            label: QualityLabel::Ripe,
            bands: &[HueBand::Below(20.0), HueBand::Above(160.0)],
        },
        BandRule {
            label: QualityLabel::Unripe,
            bands: &[GREEN],
        },
        BandRule {
            label: QualityLabel::Transitional,
            bands: &[HueBand::Between(20.0, 35.0)],
        },
    ],
    otherwise: QualityLabel::Spoiled,
};

/// Banana ripens to yellow; cyan-green reflections are transitional
static YELLOW_RIPENING: HueProfile = HueProfile {
    rules: &[
        BandRule {
            label: QualityLabel::Ripe,
            bands: &[HueBand::Between(20.0, 35.0)],
        },
        BandRule {
            label: QualityLabel::Unripe,
            bands: &[GREEN],
        },
        BandRule {
            label: QualityLabel::Transitional,
            bands: &[HueBand::Between(85.0, 120.0)],
        },
    ],
    otherwise: QualityLabel::Spoiled,
};

/// Orange ripens into the orange band; deep red and purple hues are spoiled
static ORANGE_RIPENING: HueProfile = HueProfile {
    rules: &[
        BandRule {
            label: QualityLabel::Ripe,
            bands: &[HueBand::Between(5.0, 25.0)],
        },
        BandRule {
            label: QualityLabel::Unripe,
            bands: &[GREEN],
        },
        BandRule {
            label: QualityLabel::Transitional,
            bands: &[HueBand::Between(25.0, 35.0)],
        },
    ],
    otherwise: QualityLabel::Spoiled,
};

/// Band table for a category
pub fn hue_profile(category: ProductCategory) -> &'static HueProfile {
    match category {
        ProductCategory::Apple | ProductCategory::Tomato => &RED_RIPENING,
        ProductCategory::Banana => &YELLOW_RIPENING,
        ProductCategory::Orange => &ORANGE_RIPENING,
    }
}

/// Hue-average classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct HueFallbackClassifier {
    analyzer: RegionAnalyzer,
}

impl HueFallbackClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom valid-pixel filter
    pub fn with_analyzer(analyzer: RegionAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Map a mean hue to a label for the category
    pub fn classify_hue(&self, hue_mean: f64, category: ProductCategory) -> QualityLabel {
        hue_profile(category).classify(hue_mean)
    }

    /// Mean valid hue of the region and the label it maps to
    ///
    /// # Errors
    ///
    /// Returns `EmptyRegion` when the region has no pixels.
    pub fn classify(&self, hsv: &HsvImage, category: ProductCategory) -> Result<(f64, QualityLabel)> {
        let hue_mean = self
            .analyzer
            .mean_valid_hue(hsv)
            .ok_or(GradingError::EmptyRegion {
                width: hsv.width(),
                height: hsv.height(),
            })?;
        Ok((hue_mean, self.classify_hue(hue_mean, category)))
    }
}
