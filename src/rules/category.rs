//! Product category registry and quality labels

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::ColorConverter;
use crate::error::GradingError;

/// Supported produce categories
///
/// Detector class strings are parsed into this registry; anything else is
/// an unsupported category and grades as [`QualityLabel::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Apple,
    Banana,
    Orange,
    Tomato,
}

impl ProductCategory {
    /// All registered categories, in registry order
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::Apple,
        ProductCategory::Banana,
        ProductCategory::Orange,
        ProductCategory::Tomato,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Apple => "apple",
            ProductCategory::Banana => "banana",
            ProductCategory::Orange => "orange",
            ProductCategory::Tomato => "tomato",
        }
    }

    /// Parse a detector class name, returning `None` for unregistered names
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apple" => Ok(ProductCategory::Apple),
            "banana" => Ok(ProductCategory::Banana),
            "orange" => Ok(ProductCategory::Orange),
            "tomato" => Ok(ProductCategory::Tomato),
            _ => Err(GradingError::UnsupportedCategory(s.to_string())),
        }
    }
}

/// Ripeness / defect grade assigned to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    /// Green, not yet ripe
    Unripe,
    /// Characteristic ripe color for the category
    Ripe,
    /// Brown, dark or off-color
    Spoiled,
    /// Between unripe and ripe
    Transitional,
    /// Could not be graded
    Unknown,
}

impl QualityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::Unripe => "unripe",
            QualityLabel::Ripe => "ripe",
            QualityLabel::Spoiled => "spoiled",
            QualityLabel::Transitional => "transitional",
            QualityLabel::Unknown => "unknown",
        }
    }

    /// Human-readable name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            QualityLabel::Unripe => "Unripe",
            QualityLabel::Ripe => "Ripe",
            QualityLabel::Spoiled => "Spoiled",
            QualityLabel::Transitional => "Transitional",
            QualityLabel::Unknown => "Unknown",
        }
    }

    /// Color used by rendering collaborators for boxes and labels
    pub fn display_color(&self) -> Srgb<u8> {
        match self {
            QualityLabel::Unripe => Srgb::new(50, 205, 50),
            QualityLabel::Ripe => Srgb::new(255, 69, 0),
            QualityLabel::Spoiled => Srgb::new(139, 69, 19),
            QualityLabel::Transitional => Srgb::new(255, 165, 0),
            QualityLabel::Unknown => Srgb::new(128, 128, 128),
        }
    }

    /// [`display_color`](Self::display_color) as `#RRGGBB`
    pub fn display_hex(&self) -> String {
        ColorConverter::new().srgb_to_hex(self.display_color())
    }

    /// Whether the label counts as a defect in batch statistics
    pub fn is_defect(&self) -> bool {
        matches!(self, QualityLabel::Spoiled)
    }

    /// Whether the label counts as good product in batch statistics
    pub fn is_good(&self) -> bool {
        matches!(self, QualityLabel::Ripe)
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
