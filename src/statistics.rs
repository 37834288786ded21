//! Summary statistics over a batch of graded detections

use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::statistics::*;
use crate::rules::QualityLabel;
use crate::ClassificationResult;

/// Spread of the `size_px` measurements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SizeStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation, zero for fewer than two values
    pub std_dev: f64,
    pub median: f64,
}

impl SizeStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            std_dev,
            median,
        }
    }

    /// Coefficient of variation in percent, zero when the mean is not positive
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev / self.mean * 100.0
        } else {
            0.0
        }
    }
}

/// Counts for one product category
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProductBreakdown {
    pub count: usize,
    pub qualities: BTreeMap<QualityLabel, usize>,
    pub sizes: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeVariability {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Success,
    Info,
}

/// Actionable note derived from batch statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl Recommendation {
    fn new(kind: RecommendationKind, message: impl Into<String>, suggestions: &[&str]) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Count and share of one label in a batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Share {
    pub count: usize,
    /// Percent of all items in the batch
    pub percentage: f64,
}

/// [`Share`] of a quality label with the mean score of its items
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityShare {
    pub count: usize,
    pub percentage: f64,
    pub mean_score: f64,
}

/// Aggregate view of graded results
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub quality_counts: BTreeMap<QualityLabel, usize>,
    pub size_counts: BTreeMap<String, usize>,
    /// Spoiled items
    pub defect_count: usize,
    /// Percent of items that are defects
    pub defect_rate: f64,
    /// Ripe items
    pub good_count: usize,
    pub good_rate: f64,
    pub mean_score: f64,
    pub size: SizeStats,
    /// Size coefficient of variation in percent
    pub size_cv: f64,
    pub products: BTreeMap<String, ProductBreakdown>,
    pub mean_score_by_quality: BTreeMap<QualityLabel, f64>,
}

impl BatchStatistics {
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let total = results.len();
        let percent = |count: usize| count as f64 / total as f64 * 100.0;

        let mut quality_counts: BTreeMap<QualityLabel, usize> = BTreeMap::new();
        let mut size_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut products: BTreeMap<String, ProductBreakdown> = BTreeMap::new();
        let mut score_sums: BTreeMap<QualityLabel, f64> = BTreeMap::new();

        for result in results {
            *quality_counts.entry(result.quality).or_default() += 1;
            *size_counts.entry(result.size_category.clone()).or_default() += 1;
            *score_sums.entry(result.quality).or_default() += result.quality_score;

            let product = products.entry(result.category.clone()).or_default();
            product.count += 1;
            *product.qualities.entry(result.quality).or_default() += 1;
            *product.sizes.entry(result.size_category.clone()).or_default() += 1;
        }

        let count_where = |pred: fn(&QualityLabel) -> bool| -> usize {
            quality_counts
                .iter()
                .filter(|(label, _)| pred(label))
                .map(|(_, count)| count)
                .sum()
        };
        let defect_count = count_where(QualityLabel::is_defect);
        let good_count = count_where(QualityLabel::is_good);

        let mean_score_by_quality = score_sums
            .into_iter()
            .map(|(label, sum)| (label, sum / quality_counts[&label] as f64))
            .collect();

        let sizes: Vec<f64> = results.iter().map(|r| r.size_px).collect();
        let size = SizeStats::from_values(&sizes);

        Self {
            total,
            defect_count,
            defect_rate: percent(defect_count),
            good_count,
            good_rate: percent(good_count),
            mean_score: results.iter().map(|r| r.quality_score).sum::<f64>() / total as f64,
            size_cv: size.coefficient_of_variation(),
            size,
            quality_counts,
            size_counts,
            products,
            mean_score_by_quality,
        }
    }

    pub fn size_variability(&self) -> SizeVariability {
        if self.size_cv < LOW_SIZE_VARIABILITY {
            SizeVariability::Low
        } else if self.size_cv < MEDIUM_SIZE_VARIABILITY {
            SizeVariability::Medium
        } else {
            SizeVariability::High
        }
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// Count, percentage and mean score per quality label
    pub fn quality_distribution(&self) -> BTreeMap<QualityLabel, QualityShare> {
        self.quality_counts
            .iter()
            .map(|(&label, &count)| {
                let share = QualityShare {
                    count,
                    percentage: self.percent(count),
                    mean_score: self.mean_score_by_quality.get(&label).copied().unwrap_or(0.0),
                };
                (label, share)
            })
            .collect()
    }

    /// Count and percentage per size label
    pub fn size_distribution(&self) -> BTreeMap<String, Share> {
        self.size_counts
            .iter()
            .map(|(label, &count)| {
                let share = Share {
                    count,
                    percentage: self.percent(count),
                };
                (label.clone(), share)
            })
            .collect()
    }

    /// Warnings and notes for an operator, most important first
    ///
    /// An empty batch yields a single informational note and no verdict.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        use RecommendationKind::*;

        if self.total == 0 {
            return vec![Recommendation::new(
                Info,
                "No data",
                &["No graded products in this batch"],
            )];
        }

        let mut notes = Vec::new();
        if self.defect_rate > HIGH_DEFECT_RATE {
            notes.push(Recommendation::new(
                Warning,
                "High defect rate (>20%). Review storage conditions.",
                &["Check storage conditions", "Sort more carefully before packing"],
            ));
        } else if self.defect_rate > MODERATE_DEFECT_RATE {
            notes.push(Recommendation::new(
                Warning,
                "Moderate defect rate (10-20%).",
                &["Monitor quality regularly", "Improve the sorting process"],
            ));
        } else {
            notes.push(Recommendation::new(
                Success,
                "Low defect rate (<10%). Quality is good.",
                &["Keep the current process", "Continue monitoring quality"],
            ));
        }

        if self.mean_score < LOW_MEAN_SCORE {
            notes.push(Recommendation::new(
                Warning,
                "Mean quality score is low.",
                &["Improve raw material quality", "Optimize handling"],
            ));
        }

        if self.size_cv > MEDIUM_SIZE_VARIABILITY {
            notes.push(Recommendation::new(
                Warning,
                "Sizes are not uniform.",
                &["Sort by size more strictly", "Standardize product size"],
            ));
        }

        notes.push(Recommendation {
            kind: Info,
            message: "Quality overview".to_string(),
            suggestions: vec![
                format!(
                    "Good products: {}/{} ({:.1}%)",
                    self.good_count, self.total, self.good_rate
                ),
                format!("Mean score: {:.2}/1.0", self.mean_score),
            ],
        });
        notes
    }
}

/// Statistics over several frames, each graded separately
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FrameStatistics {
    /// Statistics over every detection of every frame
    pub overall: BatchStatistics,
    /// One entry per input frame, in input order
    pub frames: Vec<BatchStatistics>,
    pub total_frames: usize,
    pub mean_detections_per_frame: f64,
    pub frames_with_detections: usize,
    pub max_detections_frame: usize,
    pub min_detections_frame: usize,
}

impl FrameStatistics {
    pub fn from_frames(frames: &[Vec<ClassificationResult>]) -> Self {
        let per_frame: Vec<BatchStatistics> = frames
            .iter()
            .map(|results| BatchStatistics::from_results(results))
            .collect();
        let all: Vec<ClassificationResult> = frames.iter().flatten().cloned().collect();
        let overall = BatchStatistics::from_results(&all);

        let counts = per_frame.iter().map(|stats| stats.total);
        let total_frames = per_frame.len();
        let mean_detections_per_frame = if total_frames == 0 {
            0.0
        } else {
            overall.total as f64 / total_frames as f64
        };

        Self {
            total_frames,
            mean_detections_per_frame,
            frames_with_detections: counts.clone().filter(|&n| n > 0).count(),
            max_detections_frame: counts.clone().max().unwrap_or(0),
            min_detections_frame: counts.min().unwrap_or(0),
            overall,
            frames: per_frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::BoundingBox;

    fn result(category: &str, quality: QualityLabel, size_px: f64, score: f64) -> ClassificationResult {
        let bbox = BoundingBox::new(0.0, 0.0, size_px, size_px / 2.0);
        ClassificationResult {
            category: category.to_string(),
            bbox,
            width: bbox.width(),
            height: bbox.height(),
            area: bbox.area(),
            size_px,
            size_category: if size_px < 30.0 { "small" } else { "medium" }.to_string(),
            quality,
            quality_score: score,
        }
    }

    #[test]
    fn test_empty_batch_is_zeroed() {
        let stats = BatchStatistics::from_results(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.defect_rate, 0.0);
        assert_eq!(stats.size, SizeStats::default());
        assert!(stats.quality_distribution().is_empty());
    }

    #[test]
    fn test_empty_batch_has_no_verdict() {
        let notes = BatchStatistics::from_results(&[]).recommendations();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, RecommendationKind::Info);
        assert_eq!(notes[0].message, "No data");
    }

    #[test]
    fn test_distributions() {
        let stats = BatchStatistics::from_results(&[
            result("apple", QualityLabel::Ripe, 20.0, 0.8),
            result("apple", QualityLabel::Ripe, 40.0, 0.6),
            result("apple", QualityLabel::Spoiled, 40.0, 0.2),
            result("apple", QualityLabel::Unripe, 40.0, 0.4),
        ]);

        let quality = stats.quality_distribution();
        let ripe = quality[&QualityLabel::Ripe];
        assert_eq!(ripe.count, 2);
        assert!((ripe.percentage - 50.0).abs() < 1e-9);
        assert!((ripe.mean_score - 0.7).abs() < 1e-9);
        assert!((quality[&QualityLabel::Spoiled].percentage - 25.0).abs() < 1e-9);
        assert!(!quality.contains_key(&QualityLabel::Unknown));

        let sizes = stats.size_distribution();
        assert_eq!(sizes["medium"].count, 3);
        assert!((sizes["medium"].percentage - 75.0).abs() < 1e-9);
        assert!((sizes["small"].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_statistics() {
        let frames = vec![
            vec![
                result("apple", QualityLabel::Ripe, 20.0, 0.8),
                result("apple", QualityLabel::Spoiled, 40.0, 0.2),
                result("banana", QualityLabel::Ripe, 40.0, 0.6),
            ],
            Vec::new(),
            vec![result("orange", QualityLabel::Spoiled, 20.0, 0.3)],
        ];
        let stats = FrameStatistics::from_frames(&frames);

        assert_eq!(stats.total_frames, 3);
        assert_eq!(stats.frames.len(), 3);
        assert_eq!(stats.frames[0].total, 3);
        assert_eq!(stats.frames[1].total, 0);
        assert_eq!(stats.frames_with_detections, 2);
        assert_eq!(stats.max_detections_frame, 3);
        assert_eq!(stats.min_detections_frame, 0);
        assert!((stats.mean_detections_per_frame - 4.0 / 3.0).abs() < 1e-9);

        assert_eq!(stats.overall.total, 4);
        assert_eq!(stats.overall.defect_count, 2);
        assert!((stats.overall.defect_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_frames() {
        let stats = FrameStatistics::from_frames(&[]);
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.mean_detections_per_frame, 0.0);
        assert_eq!(stats.max_detections_frame, 0);
        assert_eq!(stats.overall.total, 0);
    }

    #[test]
    fn test_counts_and_rates() {
        let results = vec![
            result("apple", QualityLabel::Ripe, 20.0, 0.8),
            result("apple", QualityLabel::Spoiled, 40.0, 0.2),
            result("banana", QualityLabel::Ripe, 40.0, 0.6),
            result("banana", QualityLabel::Unripe, 20.0, 0.4),
        ];
        let stats = BatchStatistics::from_results(&results);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.defect_count, 1);
        assert!((stats.defect_rate - 25.0).abs() < 1e-9);
        assert_eq!(stats.good_count, 2);
        assert!((stats.good_rate - 50.0).abs() < 1e-9);
        assert!((stats.mean_score - 0.5).abs() < 1e-9);
        assert_eq!(stats.quality_counts[&QualityLabel::Ripe], 2);
        assert_eq!(stats.size_counts["small"], 2);
        assert!((stats.mean_score_by_quality[&QualityLabel::Ripe] - 0.7).abs() < 1e-9);
        assert_eq!(stats.products["banana"].count, 2);
        assert_eq!(stats.products["apple"].qualities[&QualityLabel::Spoiled], 1);
    }

    #[test]
    fn test_size_stats() {
        let results = vec![
            result("apple", QualityLabel::Ripe, 20.0, 0.5),
            result("apple", QualityLabel::Ripe, 40.0, 0.5),
            result("apple", QualityLabel::Ripe, 60.0, 0.5),
        ];
        let stats = BatchStatistics::from_results(&results);
        assert_eq!(stats.size.min, 20.0);
        assert_eq!(stats.size.max, 60.0);
        assert_eq!(stats.size.mean, 40.0);
        assert_eq!(stats.size.median, 40.0);
        let std = (800.0f64 / 3.0).sqrt();
        assert!((stats.size.std_dev - std).abs() < 1e-9);
        assert!((stats.size_cv - std / 40.0 * 100.0).abs() < 1e-9);
        assert_eq!(stats.size_variability(), SizeVariability::High);
    }

    #[test]
    fn test_single_item_has_no_spread() {
        let stats = BatchStatistics::from_results(&[result("orange", QualityLabel::Ripe, 50.0, 0.9)]);
        assert_eq!(stats.size.std_dev, 0.0);
        assert_eq!(stats.size_variability(), SizeVariability::Low);
    }

    #[test]
    fn test_recommendations() {
        let bad = BatchStatistics::from_results(&[
            result("apple", QualityLabel::Spoiled, 20.0, 0.2),
            result("apple", QualityLabel::Ripe, 80.0, 0.4),
        ]);
        let notes = bad.recommendations();
        let warnings = notes.iter().filter(|n| n.kind == RecommendationKind::Warning).count();
        assert_eq!(warnings, 3);
        assert_eq!(notes.last().map(|n| n.kind), Some(RecommendationKind::Info));

        let good = BatchStatistics::from_results(&[result("apple", QualityLabel::Ripe, 30.0, 0.8)]);
        let notes = good.recommendations();
        assert_eq!(notes[0].kind, RecommendationKind::Success);
        assert_eq!(notes.len(), 2);
        assert!(notes[1].suggestions[0].contains("1/1 (100.0%)"));
    }
}
