//! Quality and size classification
//!
//! The matcher and the hue fallback assign a quality label, the scorer
//! produces an independent score, and the size table buckets the
//! detection box. [`QualityGrader`] runs them together.

pub mod fallback;
pub mod grader;
pub mod matcher;
pub mod scoring;
pub mod size;

pub use fallback::{hue_profile, BandRule, HueBand, HueFallbackClassifier, HueProfile};
pub use grader::{AnalysisReport, QualityGrader, StageFailure};
pub use matcher::{ColorRangeMatcher, MatchOutcome};
pub use scoring::{QualityScorer, ScoreBreakdown};
pub use size::{SizeCategory, SizeTable};
