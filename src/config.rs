//! Configuration for the grading engine.
//!
//! A [`GradingConfig`] bundles the tables the grader consults. The
//! standard configuration reproduces the built-in tables; alternative
//! tables can be loaded from JSON:
//!
//! ```no_run
//! use produce_grading::{GradingConfig, QualityGrader};
//! use std::path::Path;
//!
//! // Load from file
//! let config = GradingConfig::from_json_file(Path::new("grading.json"))?;
//! let grader = QualityGrader::from_config(&config)?;
//!
//! // Or use the built-in tables
//! let config = GradingConfig::standard();
//! # Ok::<(), produce_grading::GradingError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - `rules`: HSV ranges per category and quality label
//! - `size_categories`: half-open pixel-length buckets
//! - [`AnalysisSettings`]: detection filtering for the batch pipeline

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::AnalysisSettings;
use crate::classification::SizeTable;
use crate::constants::matching::CONFIDENCE_THRESHOLD;
use crate::error::{GradingError, Result};
use crate::rules::RuleTable;

/// Complete grading configuration.
///
/// Missing sections fall back to the standard tables when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Minimum match ratio a label must strictly exceed
    pub confidence_threshold: f64,

    /// Per-category quality rules
    pub rules: RuleTable,

    /// Size buckets, scanned in order
    pub size_categories: SizeTable,

    /// Batch pipeline settings
    pub analysis: AnalysisSettings,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl GradingConfig {
    /// Built-in rule table, size table and threshold
    pub fn standard() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            rules: RuleTable::standard().clone(),
            size_categories: SizeTable::standard(),
            analysis: AnalysisSettings::default(),
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GradingError::config("Failed to parse configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GradingError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GradingError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            GradingError::config(format!("Failed to write {}", path.display()), e)
        })
    }

    /// Check every table invariant
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(GradingError::invalid_config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        let min_confidence = self.analysis.min_detection_confidence;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(GradingError::invalid_config(format!(
                "min_detection_confidence must be within [0, 1], got {}",
                min_confidence
            )));
        }
        self.rules.validate()?;
        self.size_categories.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ColorRange, ProductCategory, QualityLabel, QualityRuleSet};

    #[test]
    fn test_standard_is_valid() {
        let config = GradingConfig::standard();
        assert!(config.validate().is_ok());
        assert_eq!(config.confidence_threshold, 0.15);
        assert!(config.rules.get(ProductCategory::Tomato).is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading.json");

        let mut config = GradingConfig::standard();
        config.confidence_threshold = 0.25;
        config.to_json_file(&path).unwrap();

        let loaded = GradingConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_standard_tables() {
        let config = GradingConfig::from_json_str(r#"{"confidence_threshold": 0.3}"#).unwrap();
        assert_eq!(config.confidence_threshold, 0.3);
        assert_eq!(&config.rules, RuleTable::standard());
        assert_eq!(config.size_categories, SizeTable::standard());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = GradingConfig::standard();
        config.confidence_threshold = 1.5;
        assert!(matches!(config.validate(), Err(GradingError::InvalidConfig { .. })));

        let mut config = GradingConfig::standard();
        config.analysis.min_detection_confidence = -0.1;
        assert!(config.validate().is_err());

        // Inverted hue bounds
        let mut config = GradingConfig::standard();
        config.rules.insert(
            ProductCategory::Tomato,
            QualityRuleSet::default()
                .with_label(QualityLabel::Ripe, &[ColorRange::new([10, 0, 0], [5, 255, 255])]),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tomato"));
    }

    #[test]
    fn test_overlapping_sizes_in_json_rejected() {
        let json = r#"{
            "size_categories": [
                {"label": "small", "min": 0.0, "max": 50.0},
                {"label": "large", "min": 40.0, "max": 100.0}
            ]
        }"#;
        let err = GradingConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = GradingConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, GradingError::ConfigError { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GradingConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, GradingError::ConfigError { source: Some(_), .. }));
    }
}
