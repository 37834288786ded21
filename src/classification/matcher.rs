//! Color-range matching against a category rule set
//!
//! For every quality label, each of its HSV ranges selects the pixels
//! inside its inclusive bound box and contributes `matched / total` to
//! the label's ratio. Ratios of the same label add up without removing
//! pixels that fall in more than one range, so a label can report more
//! coverage than its geometric union. The 0.15 threshold was tuned against
//! this arithmetic; keep it.

use crate::color::HsvImage;
use crate::constants::matching::CONFIDENCE_THRESHOLD;
use crate::error::{GradingError, Result};
use crate::rules::{ColorRange, QualityLabel, QualityRuleSet};

/// Per-label ratios and the strongest label
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Accumulated ratio per label, in rule-set order
    pub ratios: Vec<(QualityLabel, f64)>,
    /// Label with the strictly greatest ratio (`Unknown` if every ratio is zero)
    pub best_label: QualityLabel,
    pub best_ratio: f64,
}

/// Rule-table matcher with a confidence threshold
#[derive(Debug, Clone, Copy)]
pub struct ColorRangeMatcher {
    threshold: f64,
}

impl Default for ColorRangeMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRangeMatcher {
    /// Create a matcher with the standard 0.15 threshold
    pub fn new() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
        }
    }

    /// Create a matcher with a custom threshold in `[0, 1]`
    pub fn with_threshold(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GradingError::InvalidParameter {
                parameter: "confidence_threshold".to_string(),
                value: threshold.to_string(),
            });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Accumulate match ratios for every label of the rule set
    pub fn match_ratios(&self, hsv: &HsvImage, rules: &QualityRuleSet) -> MatchOutcome {
        let total = hsv.pixel_count();
        let mut ratios = Vec::with_capacity(rules.rules().len());
        let mut best_label = QualityLabel::Unknown;
        let mut best_ratio = 0.0;

        for rule in rules.rules() {
            let ratio: f64 = rule
                .ranges
                .iter()
                .map(|range| range_ratio(hsv, range, total))
                .sum();

            if ratio > best_ratio {
                best_ratio = ratio;
                best_label = rule.label;
            }
            ratios.push((rule.label, ratio));
        }

        MatchOutcome {
            ratios,
            best_label,
            best_ratio,
        }
    }

    /// Best label if its ratio strictly exceeds the threshold
    pub fn accept(&self, outcome: &MatchOutcome) -> Option<QualityLabel> {
        (outcome.best_ratio > self.threshold && outcome.best_label != QualityLabel::Unknown)
            .then_some(outcome.best_label)
    }
}

fn range_ratio(hsv: &HsvImage, range: &ColorRange, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let matched = hsv
        .pixels()
        .iter()
        .filter(|p| range.contains(p[0], p[1], p[2]))
        .count();
    matched as f64 / total as f64
}
