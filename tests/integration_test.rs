//! Integration tests for the complete grading pipeline
//!
//! These tests validate the end-to-end workflow including:
//! - Rule-table matching and the hue-average fallback
//! - Score heuristic bounds and neutral defaults
//! - Size bucketing
//! - Detection filtering and cropping
//! - Configuration files and diagnostics

use std::sync::Arc;

use image::{Rgb, RgbImage};
use produce_grading::{
    analyze_detections, analyze_object, calculate_quality_score, classify_by_hue_average,
    classify_quality, classify_size, AnalysisSettings, BatchStatistics, BoundingBox, Detection,
    FrameStatistics, GradingConfig, GradingError, HsvImage, MemorySink, ProductCategory, ProductFilter,
    QualityGrader, QualityLabel,
};

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// `covered` of every 100 pixels green, the rest dark purple (hue 150)
fn partly_green(covered: u32) -> RgbImage {
    RgbImage::from_fn(100, 1, |x, _| {
        if x < covered {
            Rgb([0, 160, 0])
        } else {
            Rgb([160, 0, 160])
        }
    })
}

// ============================================================================
// Quality Classification
// ============================================================================

#[test]
fn test_black_regions_never_fail() {
    let black = solid(16, 16, [0, 0, 0]);
    for category in ProductCategory::ALL {
        let label = classify_quality(&black, category.as_str());
        if category == ProductCategory::Tomato {
            assert_eq!(label, QualityLabel::Unknown);
        } else {
            assert_eq!(label, QualityLabel::Spoiled, "{}", category);
        }
    }
}

#[test]
fn test_red_apple_scenario() {
    let region = solid(32, 32, [255, 0, 0]);
    let bbox = BoundingBox::new(0.0, 0.0, 32.0, 32.0);
    let result = analyze_object(&region, "apple", &bbox, true, true);

    assert_eq!(result.quality, QualityLabel::Ripe);
    // Flat region penalty offset by the vivid and red-hue bonuses
    assert!((result.quality_score - 0.6).abs() < 1e-9);
    assert_eq!(result.size_category, "medium");
}

#[test]
fn test_single_range_coverage_above_threshold() {
    // Green is only inside the unripe range of the orange rules
    assert_eq!(classify_quality(&partly_green(16), "orange"), QualityLabel::Unripe);
    assert_eq!(classify_quality(&partly_green(60), "orange"), QualityLabel::Unripe);
    // 15% is not enough, purple dominates the mean hue
    assert_eq!(classify_quality(&partly_green(15), "orange"), QualityLabel::Spoiled);
}

#[test]
fn test_fallback_examples() {
    let deep_orange = HsvImage::filled(10, 10, [5, 200, 150]);
    assert_eq!(classify_by_hue_average(&deep_orange, "orange"), QualityLabel::Ripe);

    let purple = HsvImage::filled(10, 10, [150, 200, 150]);
    assert_eq!(classify_by_hue_average(&purple, "banana"), QualityLabel::Spoiled);
}

#[test]
fn test_unsupported_inputs_are_unknown() {
    let region = solid(8, 8, [255, 0, 0]);
    assert_eq!(classify_quality(&region, "kiwi"), QualityLabel::Unknown);
    assert_eq!(classify_quality(&region, ""), QualityLabel::Unknown);
    assert_eq!(classify_quality(&RgbImage::new(0, 0), "apple"), QualityLabel::Unknown);
    assert_eq!(classify_quality(&region, "tomato"), QualityLabel::Unknown);

    let err = QualityGrader::new()
        .try_classify_quality(&region, "kiwi")
        .unwrap_err();
    assert!(matches!(err, GradingError::UnsupportedCategory(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_classification_is_idempotent() {
    let region = RgbImage::from_fn(20, 20, |x, y| Rgb([(x * 12) as u8, (y * 12) as u8, 40]));
    for category in ["apple", "banana", "orange", "tomato"] {
        assert_eq!(classify_quality(&region, category), classify_quality(&region, category));
    }
    let first = calculate_quality_score(&region);
    let second = calculate_quality_score(&region);
    assert_eq!(first.to_bits(), second.to_bits());
}

// ============================================================================
// Score and Size
// ============================================================================

#[test]
fn test_score_bounds_and_neutral_default() {
    assert_eq!(calculate_quality_score(&RgbImage::new(0, 0)), 0.5);
    for rgb in [[0, 0, 0], [255, 255, 255], [255, 255, 0], [20, 90, 200]] {
        let score = calculate_quality_score(&solid(5, 5, rgb));
        assert!((0.0..=1.0).contains(&score), "{:?} -> {}", rgb, score);
    }
}

#[test]
fn test_size_partition() {
    let expected = [
        (0.0, "small"),
        (29.9, "small"),
        (30.0, "medium"),
        (60.0, "large"),
        (100.0, "extra large"),
        (199.99, "extra large"),
        (200.0, "undetermined"),
        (-3.0, "undetermined"),
    ];
    for (measurement, label) in expected {
        assert_eq!(classify_size(measurement), label, "{}", measurement);
    }
}

// ============================================================================
// Diagnostics and Reports
// ============================================================================

#[test]
fn test_memory_sink_receives_ratios() {
    let sink = Arc::new(MemorySink::new());
    let grader = QualityGrader::new().with_sink(sink.clone());

    grader.classify_quality(&partly_green(40), "banana");

    let ratios = sink.last_ratios().expect("ratios recorded");
    let unripe = ratios
        .iter()
        .find(|(label, _)| *label == QualityLabel::Unripe)
        .map(|(_, ratio)| *ratio)
        .unwrap();
    assert!((unripe - 0.4).abs() < 1e-12);
}

#[test]
fn test_report_exposes_absorbed_failures() {
    let grader = QualityGrader::new();
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let report = grader.analyze_object_report(&solid(10, 10, [255, 0, 0]), "tomato", &bbox, true, true);

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, GradingError::MissingRuleSet(_)));
    assert_eq!(report.result.quality, QualityLabel::Unknown);
    assert_eq!(report.result.size_category, "small");
}

// ============================================================================
// Batch Pipeline
// ============================================================================

#[test]
fn test_batch_filters_and_statistics() {
    let frame = RgbImage::from_fn(200, 100, |x, _| {
        if x < 100 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 0])
        }
    });
    let detections = vec![
        Detection::new("apple", 0.92, BoundingBox::new(0.0, 0.0, 50.0, 50.0)),
        Detection::new("apple", 0.88, BoundingBox::new(120.0, 10.0, 180.0, 70.0)),
        Detection::new("banana", 0.95, BoundingBox::new(10.0, 10.0, 40.0, 40.0)),
        Detection::new("apple", 0.45, BoundingBox::new(0.0, 0.0, 20.0, 20.0)),
        Detection::new("cup", 0.99, BoundingBox::new(0.0, 0.0, 20.0, 20.0)),
    ];

    let apples_only = AnalysisSettings {
        product: ProductFilter::Only(ProductCategory::Apple),
        ..AnalysisSettings::default()
    };
    let results = analyze_detections(&QualityGrader::new(), &frame, &detections, &apples_only);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].quality, QualityLabel::Ripe);
    assert_eq!(results[1].quality, QualityLabel::Spoiled);
    assert_eq!(results[1].size_category, "large");

    let all = analyze_detections(&QualityGrader::new(), &frame, &detections, &AnalysisSettings::default());
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].category, "banana");

    let stats = BatchStatistics::from_results(&results);
    assert_eq!(stats.defect_count, 1);
    assert!((stats.defect_rate - 50.0).abs() < 1e-9);
    assert!(!stats.recommendations().is_empty());

    let frames = FrameStatistics::from_frames(&[results, Vec::new(), all]);
    assert_eq!(frames.total_frames, 3);
    assert_eq!(frames.frames_with_detections, 2);
    assert_eq!(frames.overall.total, 5);
    assert_eq!(frames.max_detections_frame, 3);
    assert_eq!(frames.min_detections_frame, 0);
    assert_eq!(frames.overall.size_distribution()["large"].count, 2);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_custom_threshold_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strict.json");

    let mut config = GradingConfig::standard();
    config.confidence_threshold = 0.5;
    config.to_json_file(&path).unwrap();

    let grader = QualityGrader::from_config(&GradingConfig::from_json_file(&path).unwrap()).unwrap();
    // 40% green no longer clears the threshold; mean hue falls in the purple band
    assert_eq!(grader.classify_quality(&partly_green(40), "orange"), QualityLabel::Spoiled);
    assert_eq!(classify_quality(&partly_green(40), "orange"), QualityLabel::Unripe);
}
