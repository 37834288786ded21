//! Thresholds and reference values for produce grading
//!
//! This module contains compile-time constants for HSV rule matching,
//! the hue-average fallback, and the quality scoring heuristic. The
//! thresholds were calibrated against 8-bit OpenCV-style HSV values.

/// 8-bit HSV channel bounds (OpenCV convention)
pub mod hsv {
    /// Maximum hue value (degrees halved to fit a byte)
    pub const HUE_MAX: u8 = 179;

    /// Maximum saturation value
    pub const SATURATION_MAX: u8 = 255;

    /// Maximum value (brightness)
    pub const VALUE_MAX: u8 = 255;

    /// Hue period used to wrap negative hue angles
    pub const HUE_PERIOD: i32 = 180;

    /// Fixed-point shift for the integer HSV conversion
    pub const FIXED_POINT_SHIFT: u32 = 12;
}

/// Color-range matcher parameters
pub mod matching {
    /// Minimum accumulated ratio for a rule-table label to be accepted
    pub const CONFIDENCE_THRESHOLD: f64 = 0.15;
}

/// Pixel filter applied before averaging hue in the fallback classifier
pub mod hue_filter {
    /// Saturation must exceed this to carry a reliable hue
    pub const MIN_SATURATION: u8 = 30;

    /// Value must exceed this (excludes near-black)
    pub const MIN_VALUE: u8 = 30;

    /// Value must stay below this (excludes near-white)
    pub const MAX_VALUE: u8 = 220;
}

/// Quality scoring heuristic parameters
pub mod scoring {
    /// Starting score before adjustments
    pub const BASE_SCORE: f64 = 0.5;

    /// Score returned for empty regions
    pub const NEUTRAL_SCORE: f64 = 0.5;

    /// Luminance standard deviation above which contrast is high
    pub const HIGH_CONTRAST: f64 = 60.0;
    /// Luminance standard deviation above which contrast is moderate
    pub const MODERATE_CONTRAST: f64 = 40.0;
    /// Luminance standard deviation below which contrast is flat
    pub const LOW_CONTRAST: f64 = 20.0;

    pub const HIGH_CONTRAST_BONUS: f64 = 0.2;
    pub const MODERATE_CONTRAST_BONUS: f64 = 0.1;
    pub const LOW_CONTRAST_PENALTY: f64 = 0.1;

    /// Well-exposed brightness band (exclusive bounds)
    pub const WELL_EXPOSED: (f64, f64) = (120.0, 180.0);
    /// Acceptable brightness band (exclusive bounds)
    pub const ACCEPTABLE_EXPOSURE: (f64, f64) = (80.0, 220.0);
    /// Brightness below this is underexposed
    pub const UNDEREXPOSED: f64 = 50.0;
    /// Brightness above this is overexposed
    pub const OVEREXPOSED: f64 = 230.0;

    pub const WELL_EXPOSED_BONUS: f64 = 0.2;
    pub const ACCEPTABLE_EXPOSURE_BONUS: f64 = 0.1;
    pub const EXPOSURE_PENALTY: f64 = 0.1;

    /// Mean saturation above which color is vivid
    pub const VIVID_SATURATION: f64 = 100.0;
    /// Mean saturation below which color is washed out
    pub const WASHED_OUT_SATURATION: f64 = 30.0;

    pub const VIVID_BONUS: f64 = 0.1;
    pub const WASHED_OUT_PENALTY: f64 = 0.1;

    /// Red/orange band: mean hue below the first or above the second bound
    pub const RED_HUE_BOUNDS: (f64, f64) = (25.0, 160.0);
    /// Yellow-orange band `[lo, hi)`
    pub const YELLOW_ORANGE_HUE: (f64, f64) = (20.0, 35.0);

    pub const RED_HUE_BONUS: f64 = 0.1;
    pub const YELLOW_ORANGE_HUE_BONUS: f64 = 0.15;
}

/// Size bucketing defaults
pub mod size {
    /// Label returned when no size interval contains the measurement
    pub const UNDETERMINED: &str = "undetermined";
}

/// Detection filtering defaults
pub mod detection {
    /// Minimum detector confidence for a detection to be graded
    pub const MIN_DETECTION_CONFIDENCE: f64 = 0.5;
}

/// Batch statistics thresholds (percentages)
pub mod statistics {
    /// Defect rate above which a high-defect warning is raised
    pub const HIGH_DEFECT_RATE: f64 = 20.0;
    /// Defect rate above which a moderate-defect warning is raised
    pub const MODERATE_DEFECT_RATE: f64 = 10.0;
    /// Mean quality score below which a warning is raised
    pub const LOW_MEAN_SCORE: f64 = 0.5;
    /// Size coefficient of variation below which variability is low
    pub const LOW_SIZE_VARIABILITY: f64 = 20.0;
    /// Size coefficient of variation below which variability is medium
    pub const MEDIUM_SIZE_VARIABILITY: f64 = 40.0;
}
