//! Color conversion and pixel statistics module
//!
//! This module handles RGB to HSV and luminance conversions and the
//! per-channel statistics the classifiers consume.

pub mod analysis;
pub mod conversion;

pub use analysis::{describe_hsv, ChannelStats, HsvSummary, LumaStats, RegionAnalyzer};
pub use conversion::{ColorConverter, HsvImage};
