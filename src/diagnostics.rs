//! Diagnostics emitted while grading a region
//!
//! The grader reports intermediate values (HSV summaries, per-label
//! ratios, fallback decisions, absorbed failures) to a [`DiagnosticsSink`].
//! The default [`TracingSink`] forwards them to `tracing`; [`MemorySink`]
//! keeps them for inspection in tests.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::color::HsvSummary;
use crate::rules::QualityLabel;

/// Sub-computation of a region analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Matching,
    Fallback,
    Scoring,
    Sizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Matching => "matching",
            Stage::Fallback => "fallback",
            Stage::Scoring => "scoring",
            Stage::Sizing => "sizing",
        }
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// HSV channel statistics of a region about to be matched
    HsvSummary {
        category: String,
        width: u32,
        height: u32,
        summary: HsvSummary,
    },
    /// Accumulated ratio per label, in rule-set order
    LabelRatios {
        category: String,
        ratios: Vec<(QualityLabel, f64)>,
    },
    /// Best label cleared the confidence threshold
    MatchAccepted {
        category: String,
        label: QualityLabel,
        ratio: f64,
    },
    /// Best label did not clear the threshold; fallback follows
    BelowThreshold {
        category: String,
        best_ratio: f64,
        threshold: f64,
    },
    /// Hue-average fallback decision
    FallbackHue {
        category: String,
        hue_mean: f64,
        label: QualityLabel,
    },
    /// A sub-computation failed and its field was defaulted
    StageFailed { stage: Stage, error: String },
}

/// Receiver for grading diagnostics
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::HsvSummary {
                category,
                width,
                height,
                summary,
            } => debug!(
                %category,
                width,
                height,
                h_mean = summary.hue.mean,
                s_mean = summary.saturation.mean,
                v_mean = summary.value.mean,
                h_range = ?(summary.hue.min, summary.hue.max),
                s_range = ?(summary.saturation.min, summary.saturation.max),
                v_range = ?(summary.value.min, summary.value.max),
                "region hsv summary: {}",
                summary.describe()
            ),
            DiagnosticEvent::LabelRatios { category, ratios } => {
                for (label, ratio) in ratios.iter().filter(|(_, r)| *r > 0.0) {
                    debug!(%category, label = label.as_str(), ratio = *ratio, "label ratio");
                }
            }
            DiagnosticEvent::MatchAccepted {
                category,
                label,
                ratio,
            } => debug!(%category, label = label.as_str(), ratio, "rule match accepted"),
            DiagnosticEvent::BelowThreshold {
                category,
                best_ratio,
                threshold,
            } => debug!(
                %category,
                best_ratio,
                threshold,
                "no label cleared the threshold, using hue fallback"
            ),
            DiagnosticEvent::FallbackHue {
                category,
                hue_mean,
                label,
            } => debug!(%category, hue_mean, label = label.as_str(), "hue fallback"),
            DiagnosticEvent::StageFailed { stage, error } => {
                warn!(stage = stage.as_str(), %error, "grading stage failed, using default")
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Buffers events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return recorded events
    pub fn drain(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Ratios from the most recent `LabelRatios` event
    pub fn last_ratios(&self) -> Option<Vec<(QualityLabel, f64)>> {
        self.events().into_iter().rev().find_map(|event| match event {
            DiagnosticEvent::LabelRatios { ratios, .. } => Some(ratios),
            _ => None,
        })
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
