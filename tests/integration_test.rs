//! Integration tests for the complete VOC evaluation pipeline.

use voc_eval::config::{EvaluationConfig, RelativeConfig};
use voc_eval::evaluator::evaluate;
use voc_eval::metrics::ap::ApMethod;
use voc_eval::relative::{relative_f1, relative_map};
use voc_eval::types::{BoundingBox, BoundingBoxes};

fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
    BoundingBox::new(x1, y1, x2, y2)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_single_class_tp_then_fp() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("img1", "A", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img1", "A", 0.9, bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img1", "A", 0.8, bbox(20.0, 20.0, 30.0, 30.0));

    let report = evaluate(&boxes, &EvaluationConfig::default()).unwrap();
    let result = report.class("A").unwrap();

    assert_eq!(result.total_tp, 1);
    assert_eq!(result.total_fp, 1);
    assert_eq!(result.recall, vec![1.0, 1.0]);
    assert_eq!(result.precision, vec![1.0, 0.5]);
    assert_eq!(result.ap, 1.0);
}

#[test]
fn test_claimed_ground_truth_makes_second_detection_fp() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("img1", "A", bbox(0.0, 0.0, 10.0, 10.0));
    // Inserted out of order on purpose: matching follows confidence
    boxes.add_detection("img1", "A", 0.7, bbox(1.0, 1.0, 10.0, 10.0));
    boxes.add_detection("img1", "A", 0.9, bbox(0.0, 0.0, 10.0, 10.0));

    let report = evaluate(&boxes, &EvaluationConfig::default()).unwrap();
    let result = report.class("A").unwrap();

    assert_eq!(result.total_tp, 1);
    assert_eq!(result.total_fp, 1);
    assert_eq!(result.precision, vec![1.0, 0.5]);
}

#[test]
fn test_multi_class_map() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("img1", "A", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img1", "A", 0.9, bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_ground_truth("img2", "B", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img2", "B", 0.5, bbox(50.0, 50.0, 60.0, 60.0));

    let report = evaluate(&boxes, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.ap_per_class(), vec![("A", 1.0), ("B", 0.0)]);
    assert_close(report.map, 0.5);
}

#[test]
fn test_every_point_and_eleven_point_differ() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("img1", "car", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_ground_truth("img1", "car", bbox(100.0, 100.0, 110.0, 110.0));
    boxes.add_detection("img1", "car", 0.9, bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img1", "car", 0.8, bbox(50.0, 50.0, 60.0, 60.0));
    boxes.add_detection("img1", "car", 0.7, bbox(100.0, 100.0, 110.0, 110.0));

    let every = evaluate(&boxes, &EvaluationConfig::new(0.5, ApMethod::EveryPoint)).unwrap();
    let eleven = evaluate(&boxes, &EvaluationConfig::new(0.5, ApMethod::ElevenPoint)).unwrap();

    // recall [0.5, 0.5, 1.0], precision [1.0, 0.5, 2/3]
    assert_close(every.map, 0.5 + 0.5 * (2.0 / 3.0));
    assert_close(eleven.map, (6.0 + 5.0 * (2.0 / 3.0)) / 11.0);
    assert_eq!(eleven.method, ApMethod::ElevenPoint);
}

#[test]
fn test_interpolated_curve_is_reported() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("img1", "A", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("img1", "A", 0.9, bbox(0.0, 0.0, 10.0, 10.0));

    let report = evaluate(&boxes, &EvaluationConfig::default()).unwrap();
    let result = report.class("A").unwrap();

    assert_eq!(result.interpolated_recall, vec![0.0, 1.0]);
    assert_eq!(result.interpolated_precision, vec![1.0, 1.0]);
}

#[test]
fn test_relative_f1_all_and_detected_frames() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("frame1", "3", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_ground_truth("frame2", "3", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("frame1", "3", 0.9, bbox(0.0, 0.0, 10.0, 10.0));

    let report = relative_f1(&boxes, &RelativeConfig::new(["3"])).unwrap();

    assert_eq!(report.all_frames.precision, 1.0);
    assert_eq!(report.all_frames.recall, 0.5);
    assert_eq!(report.all_frames.f1, 0.667);
    assert_eq!(report.all_frames.total_count, 2);

    assert_eq!(report.detected_frames.precision, 1.0);
    assert_eq!(report.detected_frames.recall, 1.0);
    assert_eq!(report.detected_frames.f1, 1.0);

    assert_eq!(report.stats.total_frames, 2);
    assert_eq!(report.stats.detected_frames, 1);
}

#[test]
fn test_relative_f1_report_json_keys() {
    let mut boxes = BoundingBoxes::new();
    boxes.add_ground_truth("frame1", "3", bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("frame1", "3", 0.9, bbox(0.0, 0.0, 10.0, 10.0));

    let report = relative_f1(&boxes, &RelativeConfig::new(["3"])).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["All Frames F1"]["f1"], 1.0);
    assert_eq!(json["Detected Frames F1"]["total_tp"], 1);
    assert_eq!(json["Stats"]["Total Frames"], 1);
}

#[test]
fn test_relative_map_against_reference_detector() {
    let mut boxes = BoundingBoxes::new();
    for frame in ["frame1", "frame2"] {
        boxes.push(
            voc_eval::types::Annotation::ground_truth(frame, "3", bbox(0.0, 0.0, 10.0, 10.0))
                .with_confidence(0.6),
        );
    }
    boxes.add_detection("frame1", "3", 0.9, bbox(0.0, 0.0, 10.0, 10.0));
    boxes.add_detection("frame2", "3", 0.8, bbox(40.0, 40.0, 50.0, 50.0));
    // Not whitelisted, ignored on both sides
    boxes.add_detection("frame2", "9", 0.8, bbox(0.0, 0.0, 10.0, 10.0));

    let report = relative_map(&boxes, &RelativeConfig::new(["3"])).unwrap();

    assert_eq!(report.summary.class_count, 1);
    let result = &report.classes[0];
    assert_eq!(result.class_id, "3");
    assert_eq!(result.total_positives, 2);
    assert_eq!(result.total_tp, 1);
    assert_eq!(result.precision, vec![1.0, 0.5]);
    assert_close(report.summary.map, 0.5);
}
