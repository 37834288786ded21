//! # Produce Grading
//!
//! A Rust crate for grading detected produce from the colors of its image region.
//!
//! This library assigns each detection:
//! - A quality label from per-category HSV color rules, with a hue-average fallback
//! - A heuristic quality score in `[0, 1]`
//! - A size bucket from the larger side of its bounding box
//!
//! ## Example
//!
//! ```rust,no_run
//! use produce_grading::{analyze_object, BoundingBox};
//! use produce_grading::image_loader::load_image;
//! use produce_grading::region::crop_region;
//! use std::path::Path;
//!
//! let frame = load_image(Path::new("crate_07.jpg"))?;
//! let bbox = BoundingBox::new(120.0, 80.0, 190.0, 150.0);
//! let region = crop_region(&frame, &bbox);
//!
//! let result = analyze_object(&region, "apple", &bbox, true, true);
//! println!("{}: {} ({:.2}), {}", result.category, result.quality, result.quality_score, result.size_category);
//! # Ok::<(), produce_grading::GradingError>(())
//! ```

use image::RgbImage;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub mod batch;
pub mod classification;
pub mod color;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod image_loader;
pub mod region;
pub mod rules;
pub mod statistics;

pub use batch::{analyze_detections, AnalysisSettings, Detection, ProductFilter};
pub use classification::{AnalysisReport, QualityGrader, SizeCategory, SizeTable, StageFailure};
pub use color::HsvImage;
pub use config::GradingConfig;
pub use diagnostics::{DiagnosticEvent, DiagnosticsSink, MemorySink, NullSink, Stage, TracingSink};
pub use error::{GradingError, Result};
pub use region::BoundingBox;
pub use rules::{ColorRange, ProductCategory, QualityLabel, QualityRuleSet, RuleTable};
pub use statistics::{BatchStatistics, FrameStatistics};

/// Grading outcome for one detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Category label as reported by the detector
    pub category: String,
    /// Detector box in frame pixel coordinates
    pub bbox: BoundingBox,
    /// Box width in pixels
    pub width: f64,
    /// Box height in pixels
    pub height: f64,
    /// Box area in square pixels
    pub area: f64,
    /// Larger side of the bounding box
    pub size_px: f64,
    /// Size bucket of `size_px`, `undetermined` when disabled or out of range
    pub size_category: String,
    /// Ripeness label, `unknown` when disabled or not gradable
    pub quality: QualityLabel,
    /// Heuristic score (0.0 = poor, 1.0 = good)
    pub quality_score: f64,
}

static DEFAULT_GRADER: Lazy<QualityGrader> = Lazy::new(QualityGrader::new);

/// Grade a detected region with the standard tables
///
/// Never fails: a sub-computation that cannot produce a value degrades to
/// `unknown`, `undetermined` or a `0.5` score, and the cause is logged via
/// `tracing`. Use [`QualityGrader::analyze_object_report`] to inspect causes.
pub fn analyze_object(
    region: &RgbImage,
    category: &str,
    bbox: &BoundingBox,
    enable_quality: bool,
    enable_size: bool,
) -> ClassificationResult {
    DEFAULT_GRADER.analyze_object(region, category, bbox, enable_quality, enable_size)
}

/// Quality label of a region with the standard rule table
pub fn classify_quality(region: &RgbImage, category: &str) -> QualityLabel {
    DEFAULT_GRADER.classify_quality(region, category)
}

/// Hue-average quality label of an HSV region
pub fn classify_by_hue_average(hsv: &HsvImage, category: &str) -> QualityLabel {
    DEFAULT_GRADER.classify_by_hue_average(hsv, category)
}

/// Heuristic quality score, `0.5` for an empty region
pub fn calculate_quality_score(region: &RgbImage) -> f64 {
    DEFAULT_GRADER.calculate_quality_score(region)
}

/// Standard size bucket of a pixel length
pub fn classify_size(measurement: f64) -> String {
    DEFAULT_GRADER.classify_size(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_classification_result_serialization() {
        let region = RgbImage::from_pixel(30, 20, Rgb([255, 0, 0]));
        let bbox = BoundingBox::new(0.0, 0.0, 30.0, 20.0);
        let result = analyze_object(&region, "apple", &bbox, true, true);

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""quality":"ripe""#));
        assert!(json.contains(r#""size_category":"medium""#));

        let deserialized: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }

    #[test]
    fn test_disabled_stages_use_neutral_values() {
        let region = RgbImage::from_pixel(30, 20, Rgb([255, 0, 0]));
        let bbox = BoundingBox::new(0.0, 0.0, 30.0, 20.0);
        let result = analyze_object(&region, "apple", &bbox, false, false);

        assert_eq!(result.quality, QualityLabel::Unknown);
        assert_eq!(result.size_category, "undetermined");
        assert_eq!(result.width, 30.0);
        assert_eq!(result.height, 20.0);
        assert_eq!(result.area, 600.0);
        assert_eq!(result.bbox, bbox);
    }

    #[test]
    fn test_free_functions_use_standard_tables() {
        assert_eq!(classify_size(10.0), "small");
        assert_eq!(classify_size(250.0), "undetermined");
        assert_eq!(calculate_quality_score(&RgbImage::new(0, 0)), 0.5);
        assert_eq!(
            classify_quality(&RgbImage::from_pixel(3, 3, Rgb([255, 0, 0])), "apple"),
            QualityLabel::Ripe
        );
    }
}
