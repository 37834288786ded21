//! Region analysis orchestrator
//!
//! [`QualityGrader`] ties the rule-table matcher, the hue fallback, the
//! score heuristic and the size bucketer together. Every sub-computation
//! has a fallible `try_*` form; the infallible forms absorb the error into
//! a neutral default (`unknown`, `0.5`, `undetermined`) and report it to
//! the diagnostics sink.

use std::fmt;
use std::sync::Arc;

use image::RgbImage;

use crate::classification::fallback::HueFallbackClassifier;
use crate::classification::matcher::ColorRangeMatcher;
use crate::classification::scoring::QualityScorer;
use crate::classification::size::SizeTable;
use crate::color::{HsvImage, RegionAnalyzer};
use crate::config::GradingConfig;
use crate::constants::scoring::NEUTRAL_SCORE;
use crate::constants::size::UNDETERMINED;
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink, Stage, TracingSink};
use crate::error::{GradingError, Result};
use crate::region::BoundingBox;
use crate::rules::{ProductCategory, QualityLabel, RuleTable};
use crate::ClassificationResult;

/// A sub-computation that failed during [`QualityGrader::analyze_object_report`]
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: GradingError,
}

/// Result of an analysis together with the failures absorbed into it
#[derive(Debug)]
pub struct AnalysisReport {
    pub result: ClassificationResult,
    pub failures: Vec<StageFailure>,
}

impl AnalysisReport {
    /// True when every enabled stage produced its own value
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rule-based quality and size grader
///
/// Holds read-only tables; share one instance across threads.
pub struct QualityGrader {
    rules: RuleTable,
    sizes: SizeTable,
    matcher: ColorRangeMatcher,
    fallback: HueFallbackClassifier,
    scorer: QualityScorer,
    analyzer: RegionAnalyzer,
    sink: Arc<dyn DiagnosticsSink>,
}

impl fmt::Debug for QualityGrader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityGrader")
            .field("rules", &self.rules)
            .field("sizes", &self.sizes)
            .field("threshold", &self.matcher.threshold())
            .finish_non_exhaustive()
    }
}

impl Default for QualityGrader {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityGrader {
    /// Grader with the standard rule table, size table and threshold
    pub fn new() -> Self {
        Self {
            rules: RuleTable::standard().clone(),
            sizes: SizeTable::standard(),
            matcher: ColorRangeMatcher::new(),
            fallback: HueFallbackClassifier::new(),
            scorer: QualityScorer::new(),
            analyzer: RegionAnalyzer::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Grader from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` or `InvalidParameter` if the configuration
    /// violates a table invariant.
    pub fn from_config(config: &GradingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rules: config.rules.clone(),
            sizes: config.size_categories.clone(),
            matcher: ColorRangeMatcher::with_threshold(config.confidence_threshold)?,
            ..Self::new()
        })
    }

    /// Replace the diagnostics sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn sizes(&self) -> &SizeTable {
        &self.sizes
    }

    pub fn threshold(&self) -> f64 {
        self.matcher.threshold()
    }

    /// Quality label of a region, `unknown` on any failure
    pub fn classify_quality(&self, region: &RgbImage, category: &str) -> QualityLabel {
        self.try_classify_quality(region, category)
            .unwrap_or_else(|error| self.absorb(Stage::Matching, error, QualityLabel::Unknown))
    }

    /// Quality label of a region
    ///
    /// # Errors
    ///
    /// Checked in order: `UnsupportedCategory` for an unregistered
    /// category, `MissingRuleSet` when the table has no rules for it,
    /// `EmptyRegion` for a region without pixels.
    pub fn try_classify_quality(&self, region: &RgbImage, category: &str) -> Result<QualityLabel> {
        let product: ProductCategory = category.parse()?;
        let rules = self
            .rules
            .get(product)
            .ok_or_else(|| GradingError::MissingRuleSet(product.to_string()))?;
        if region.width() == 0 || region.height() == 0 {
            return Err(GradingError::EmptyRegion {
                width: region.width(),
                height: region.height(),
            });
        }

        let hsv = HsvImage::from_rgb(region);
        if let Some(summary) = self.analyzer.summarize(&hsv) {
            self.sink.record(DiagnosticEvent::HsvSummary {
                category: product.to_string(),
                width: hsv.width(),
                height: hsv.height(),
                summary,
            });
        }

        let outcome = self.matcher.match_ratios(&hsv, rules);
        self.sink.record(DiagnosticEvent::LabelRatios {
            category: product.to_string(),
            ratios: outcome.ratios.clone(),
        });

        match self.matcher.accept(&outcome) {
            Some(label) => {
                self.sink.record(DiagnosticEvent::MatchAccepted {
                    category: product.to_string(),
                    label,
                    ratio: outcome.best_ratio,
                });
                Ok(label)
            }
            None => {
                self.sink.record(DiagnosticEvent::BelowThreshold {
                    category: product.to_string(),
                    best_ratio: outcome.best_ratio,
                    threshold: self.matcher.threshold(),
                });
                self.fallback_label(&hsv, product)
            }
        }
    }

    /// Hue-average label of an HSV region, `unknown` on any failure
    pub fn classify_by_hue_average(&self, hsv: &HsvImage, category: &str) -> QualityLabel {
        self.try_classify_by_hue_average(hsv, category)
            .unwrap_or_else(|error| self.absorb(Stage::Fallback, error, QualityLabel::Unknown))
    }

    /// Hue-average label of an HSV region
    ///
    /// Works for every registered category, including those without a
    /// rule set.
    pub fn try_classify_by_hue_average(&self, hsv: &HsvImage, category: &str) -> Result<QualityLabel> {
        let product: ProductCategory = category.parse()?;
        self.fallback_label(hsv, product)
    }

    fn fallback_label(&self, hsv: &HsvImage, product: ProductCategory) -> Result<QualityLabel> {
        let (hue_mean, label) = self.fallback.classify(hsv, product)?;
        self.sink.record(DiagnosticEvent::FallbackHue {
            category: product.to_string(),
            hue_mean,
            label,
        });
        Ok(label)
    }

    /// Heuristic quality score in `[0, 1]`, `0.5` on failure
    pub fn calculate_quality_score(&self, region: &RgbImage) -> f64 {
        self.try_quality_score(region)
            .unwrap_or_else(|error| self.absorb(Stage::Scoring, error, NEUTRAL_SCORE))
    }

    pub fn try_quality_score(&self, region: &RgbImage) -> Result<f64> {
        self.scorer.score(region)
    }

    /// Size label for a pixel length, `undetermined` when uncovered
    pub fn classify_size(&self, measurement: f64) -> String {
        self.sizes.classify_size(measurement).to_string()
    }

    pub fn try_classify_size(&self, measurement: f64) -> Result<String> {
        self.sizes.try_classify_size(measurement).map(str::to_string)
    }

    /// Grade one detected region
    ///
    /// Always returns a complete result. Disabled stages take their
    /// neutral value; the score is computed regardless of the flags.
    pub fn analyze_object(
        &self,
        region: &RgbImage,
        category: &str,
        bbox: &BoundingBox,
        enable_quality: bool,
        enable_size: bool,
    ) -> ClassificationResult {
        self.analyze_object_report(region, category, bbox, enable_quality, enable_size)
            .result
    }

    /// Like [`analyze_object`](Self::analyze_object) but keeps absorbed failures
    pub fn analyze_object_report(
        &self,
        region: &RgbImage,
        category: &str,
        bbox: &BoundingBox,
        enable_quality: bool,
        enable_size: bool,
    ) -> AnalysisReport {
        let mut failures = Vec::new();

        let quality = if enable_quality {
            let quality = self.try_classify_quality(region, category);
            self.settle(&mut failures, Stage::Matching, quality, QualityLabel::Unknown)
        } else {
            QualityLabel::Unknown
        };

        let size_category = if enable_size {
            let size = self.try_classify_size(bbox.size_px());
            self.settle(&mut failures, Stage::Sizing, size, UNDETERMINED.to_string())
        } else {
            UNDETERMINED.to_string()
        };

        let score = self.try_quality_score(region);
        let quality_score = self.settle(&mut failures, Stage::Scoring, score, NEUTRAL_SCORE);

        AnalysisReport {
            result: ClassificationResult {
                category: category.to_string(),
                bbox: *bbox,
                width: bbox.width(),
                height: bbox.height(),
                area: bbox.area(),
                size_px: bbox.size_px(),
                size_category,
                quality,
                quality_score,
            },
            failures,
        }
    }

    fn absorb<T>(&self, stage: Stage, error: GradingError, default: T) -> T {
        self.report(stage, &error);
        default
    }

    fn settle<T>(
        &self,
        failures: &mut Vec<StageFailure>,
        stage: Stage,
        result: Result<T>,
        default: T,
    ) -> T {
        result.unwrap_or_else(|error| {
            self.report(stage, &error);
            failures.push(StageFailure { stage, error });
            default
        })
    }

    fn report(&self, stage: Stage, error: &GradingError) {
        self.sink.record(DiagnosticEvent::StageFailed {
            stage,
            error: error.to_string(),
        });
    }
}
