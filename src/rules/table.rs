//! HSV rule table: per-category quality rule sets
//!
//! Each product category maps quality labels to one or more inclusive HSV
//! bound boxes. A label may own several disjoint ranges; the matcher adds
//! their pixel ratios together.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::hsv::HUE_MAX;
use crate::error::{GradingError, Result};
use crate::rules::category::{ProductCategory, QualityLabel};

/// Inclusive lower/upper bounds over `[hue, saturation, value]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Whether an HSV pixel lies inside the bound box (all bounds inclusive)
    #[inline]
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.lower[0]
            && h <= self.upper[0]
            && s >= self.lower[1]
            && s <= self.upper[1]
            && v >= self.lower[2]
            && v <= self.upper[2]
    }

    fn validate(&self) -> Result<()> {
        for channel in 0..3 {
            if self.lower[channel] > self.upper[channel] {
                return Err(GradingError::invalid_config(format!(
                    "color range {:?}..{:?} has lower > upper on channel {}",
                    self.lower, self.upper, channel
                )));
            }
        }
        if self.upper[0] > HUE_MAX {
            return Err(GradingError::invalid_config(format!(
                "color range hue bound {} exceeds {}",
                self.upper[0], HUE_MAX
            )));
        }
        Ok(())
    }
}

/// Ranges attached to one quality label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRule {
    pub label: QualityLabel,
    pub ranges: Vec<ColorRange>,
}

/// Ordered quality rules for one category
///
/// Declaration order matters: on equal ratios the earlier label wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityRuleSet {
    rules: Vec<QualityRule>,
}

impl QualityRuleSet {
    pub fn new(rules: Vec<QualityRule>) -> Self {
        Self { rules }
    }

    /// Builder-style helper for authoring rule sets in code
    pub fn with_label(mut self, label: QualityLabel, ranges: &[ColorRange]) -> Self {
        self.rules.push(QualityRule {
            label,
            ranges: ranges.to_vec(),
        });
        self
    }

    pub fn rules(&self) -> &[QualityRule] {
        &self.rules
    }

    pub fn labels(&self) -> impl Iterator<Item = QualityLabel> + '_ {
        self.rules.iter().map(|rule| rule.label)
    }

    pub fn ranges_for(&self, label: QualityLabel) -> Option<&[ColorRange]> {
        self.rules
            .iter()
            .find(|rule| rule.label == label)
            .map(|rule| rule.ranges.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check label uniqueness and range bounds
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.label) {
                return Err(GradingError::invalid_config(format!(
                    "quality label '{}' declared twice",
                    rule.label
                )));
            }
            if rule.label == QualityLabel::Unknown {
                return Err(GradingError::invalid_config(
                    "'unknown' is reserved and cannot own color ranges",
                ));
            }
            for range in &rule.ranges {
                range.validate()?;
            }
        }
        Ok(())
    }
}

/// Rule sets for every configured category
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    sets: BTreeMap<ProductCategory, QualityRuleSet>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table shared by every grader created without a config
    pub fn standard() -> &'static RuleTable {
        &STANDARD_RULES
    }

    pub fn insert(&mut self, category: ProductCategory, rules: QualityRuleSet) {
        self.sets.insert(category, rules);
    }

    pub fn get(&self, category: ProductCategory) -> Option<&QualityRuleSet> {
        self.sets.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = ProductCategory> + '_ {
        self.sets.keys().copied()
    }

    pub fn validate(&self) -> Result<()> {
        for (category, rules) in &self.sets {
            rules.validate().map_err(|e| match e {
                GradingError::InvalidConfig { reason } => {
                    GradingError::invalid_config(format!("{}: {}", category, reason))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

static STANDARD_RULES: Lazy<RuleTable> = Lazy::new(|| {
    let mut table = RuleTable::new();
    table.insert(ProductCategory::Apple, apple_rules());
    table.insert(ProductCategory::Banana, banana_rules());
    table.insert(ProductCategory::Orange, orange_rules());
    // Tomato is registered for the hue fallback only; it has no authored ranges.
    table
});

const GREEN: ColorRange = ColorRange::new([35, 40, 40], [85, 255, 220]);
const DARK: ColorRange = ColorRange::new([0, 0, 0], [179, 50, 80]);
const GRAY: ColorRange = ColorRange::new([0, 0, 80], [179, 30, 150]);

fn apple_rules() -> QualityRuleSet {
    QualityRuleSet::default()
        .with_label(QualityLabel::Unripe, &[GREEN])
        .with_label(
            QualityLabel::Ripe,
            &[
                ColorRange::new([0, 50, 50], [10, 255, 255]),
                ColorRange::new([170, 50, 50], [179, 255, 255]),
                ColorRange::new([150, 40, 40], [170, 255, 220]),
            ],
        )
        .with_label(
            QualityLabel::Spoiled,
            &[ColorRange::new([10, 20, 20], [30, 150, 150]), DARK, GRAY],
        )
        .with_label(
            QualityLabel::Transitional,
            &[
                ColorRange::new([20, 40, 40], [35, 255, 220]),
                ColorRange::new([85, 30, 40], [120, 255, 200]),
            ],
        )
}

fn banana_rules() -> QualityRuleSet {
    QualityRuleSet::default()
        .with_label(QualityLabel::Unripe, &[GREEN])
        .with_label(
            QualityLabel::Ripe,
            &[
                ColorRange::new([20, 50, 100], [30, 255, 255]),
                ColorRange::new([15, 40, 80], [25, 255, 220]),
            ],
        )
        .with_label(
            QualityLabel::Spoiled,
            &[ColorRange::new([0, 30, 30], [15, 200, 150]), DARK, GRAY],
        )
        .with_label(
            QualityLabel::Transitional,
            &[
                ColorRange::new([25, 40, 40], [35, 255, 200]),
                ColorRange::new([85, 30, 40], [120, 200, 180]),
            ],
        )
}

fn orange_rules() -> QualityRuleSet {
    QualityRuleSet::default()
        .with_label(QualityLabel::Unripe, &[GREEN])
        .with_label(
            QualityLabel::Ripe,
            &[
                ColorRange::new([5, 50, 80], [15, 255, 255]),
                ColorRange::new([0, 50, 80], [10, 255, 220]),
                ColorRange::new([15, 40, 80], [25, 255, 220]),
            ],
        )
        .with_label(
            QualityLabel::Spoiled,
            &[
                ColorRange::new([0, 20, 20], [10, 150, 150]),
                ColorRange::new([10, 20, 20], [25, 150, 150]),
                DARK,
            ],
        )
        .with_label(
            QualityLabel::Transitional,
            &[
                ColorRange::new([20, 40, 40], [35, 255, 200]),
                ColorRange::new([25, 40, 40], [35, 255, 180]),
            ],
        )
}
