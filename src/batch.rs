//! Grading every detection of a frame
//!
//! Detections come from an external object detector. Accepted detections
//! are cropped from the frame and graded in parallel; results keep the
//! detector's order.

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classification::QualityGrader;
use crate::constants::detection::MIN_DETECTION_CONFIDENCE;
use crate::region::{crop_region, BoundingBox};
use crate::rules::ProductCategory;
use crate::ClassificationResult;

/// One detector output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }
}

/// Which detected classes to grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductFilter {
    /// Any registered product category
    #[default]
    Auto,
    /// A single category
    Only(ProductCategory),
}

impl ProductFilter {
    pub fn accepts(&self, class_name: &str) -> bool {
        match (self, ProductCategory::lookup(class_name)) {
            (_, None) => false,
            (ProductFilter::Auto, Some(_)) => true,
            (ProductFilter::Only(wanted), Some(found)) => *wanted == found,
        }
    }
}

/// Per-frame analysis switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub product: ProductFilter,
    /// Detections need a confidence strictly above this
    pub min_detection_confidence: f64,
    pub enable_quality: bool,
    pub enable_size: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            product: ProductFilter::Auto,
            min_detection_confidence: MIN_DETECTION_CONFIDENCE,
            enable_quality: true,
            enable_size: true,
        }
    }
}

impl AnalysisSettings {
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence > self.min_detection_confidence
            && self.product.accepts(&detection.class_name)
    }
}

/// Grade the accepted detections of one frame
///
/// Detections failing the filter, and those whose crop is empty, are
/// skipped.
pub fn analyze_detections(
    grader: &QualityGrader,
    image: &RgbImage,
    detections: &[Detection],
    settings: &AnalysisSettings,
) -> Vec<ClassificationResult> {
    let accepted: Vec<&Detection> = detections.iter().filter(|d| settings.accepts(d)).collect();
    debug!(
        total = detections.len(),
        accepted = accepted.len(),
        "filtered detections"
    );

    accepted
        .par_iter()
        .filter_map(|detection| {
            let region = crop_region(image, &detection.bbox);
            if region.width() == 0 || region.height() == 0 {
                debug!(class = %detection.class_name, bbox = ?detection.bbox, "skipping empty crop");
                return None;
            }
            Some(grader.analyze_object(
                &region,
                &detection.class_name,
                &detection.bbox,
                settings.enable_quality,
                settings.enable_size,
            ))
        })
        .collect()
}
