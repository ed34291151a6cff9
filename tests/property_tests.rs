//! Property-based tests using proptest
//!
//! These tests verify mathematical properties and invariants that should
//! always hold regardless of the input values.

use proptest::prelude::*;
use voc_eval::matching::match_class;
use voc_eval::metrics::ap::{calculate_ap, ApMethod, ElevenPointInterpolation};
use voc_eval::metrics::f1_score::{calculate_f1_from_counts, calculate_f1_score};
use voc_eval::metrics::iou::{boxes_intersect, calculate_iou};
use voc_eval::metrics::precision_recall::build_curve;
use voc_eval::types::{Annotation, BoundingBox};

fn bbox_strategy() -> impl Strategy<Value = BoundingBox> {
    (0u32..200, 0u32..200, 0u32..80, 0u32..80).prop_map(|(x, y, w, h)| {
        let (x, y) = (f64::from(x), f64::from(y));
        BoundingBox::new(x, y, x + f64::from(w), y + f64::from(h))
    })
}

// Property: IoU basics
proptest! {
    #[test]
    fn prop_iou_range(a in bbox_strategy(), b in bbox_strategy()) {
        let iou = calculate_iou(&a, &b);
        prop_assert!((0.0..=1.0).contains(&iou), "IoU should be in [0,1], got {}", iou);
    }

    #[test]
    fn prop_iou_symmetric(a in bbox_strategy(), b in bbox_strategy()) {
        prop_assert_eq!(calculate_iou(&a, &b), calculate_iou(&b, &a));
    }

    #[test]
    fn prop_iou_self_is_one(a in bbox_strategy()) {
        prop_assert_eq!(calculate_iou(&a, &a), 1.0);
    }

    #[test]
    fn prop_iou_zero_when_disjoint(a in bbox_strategy(), b in bbox_strategy()) {
        if !boxes_intersect(&a, &b) {
            prop_assert_eq!(calculate_iou(&a, &b), 0.0);
        }
    }
}

// Property: cumulative curves
proptest! {
    #[test]
    fn prop_recall_non_decreasing(
        flags in prop::collection::vec(any::<bool>(), 0..100),
        extra in 0usize..10
    ) {
        let total_tp = flags.iter().filter(|&&tp| tp).count();
        let total_positives = total_tp + extra;
        prop_assume!(total_positives > 0);

        let curve = build_curve(&flags, total_positives).unwrap();
        for pair in curve.recall.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
        if let Some(&last) = curve.recall.last() {
            prop_assert_eq!(last, total_tp as f64 / total_positives as f64);
        }
        for &p in &curve.precision {
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn prop_ap_in_unit_range(
        flags in prop::collection::vec(any::<bool>(), 0..100),
        extra in 0usize..10
    ) {
        let total_positives = flags.iter().filter(|&&tp| tp).count() + extra;
        prop_assume!(total_positives > 0);

        let curve = build_curve(&flags, total_positives).unwrap();
        for method in [ApMethod::EveryPoint, ApMethod::ElevenPoint] {
            let ap = calculate_ap(&curve.recall, &curve.precision, method);
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&ap), "AP out of range: {}", ap);
        }
    }

    #[test]
    fn prop_every_point_ap_matches_step_area(
        flags in prop::collection::vec(any::<bool>(), 1..60),
        extra in 0usize..5
    ) {
        let total_positives = flags.iter().filter(|&&tp| tp).count() + extra;
        prop_assume!(total_positives > 0);

        let curve = build_curve(&flags, total_positives).unwrap();

        // Area under the running-max-from-the-right precision, one recall step at a time
        let mut expected = 0.0;
        let mut previous_recall = 0.0;
        for i in 0..curve.recall.len() {
            if curve.recall[i] > previous_recall {
                let envelope = curve.precision[i..].iter().fold(0.0f64, |a, &b| a.max(b));
                expected += (curve.recall[i] - previous_recall) * envelope;
                previous_recall = curve.recall[i];
            }
        }

        let ap = calculate_ap(&curve.recall, &curve.precision, ApMethod::EveryPoint);
        prop_assert!((ap - expected).abs() < 1e-9, "{} != {}", ap, expected);
    }

    #[test]
    fn prop_perfect_detections_score_one(count in 1usize..30) {
        let flags = vec![true; count];
        let curve = build_curve(&flags, count).unwrap();
        prop_assert!((calculate_ap(&curve.recall, &curve.precision, ApMethod::EveryPoint) - 1.0).abs() < 1e-12);
        prop_assert!((calculate_ap(&curve.recall, &curve.precision, ApMethod::ElevenPoint) - 1.0).abs() < 1e-12);
    }
}

// Property: matching
proptest! {
    #[test]
    fn prop_each_ground_truth_claimed_at_most_once(
        gts in prop::collection::vec(bbox_strategy(), 1..10),
        dets in prop::collection::vec((bbox_strategy(), 0.0f64..1.0), 0..30),
        threshold in 0.0f64..=1.0
    ) {
        let gts: Vec<Annotation> = gts
            .into_iter()
            .map(|b| Annotation::ground_truth("img", "A", b))
            .collect();
        let dets: Vec<Annotation> = dets
            .into_iter()
            .map(|(b, conf)| Annotation::detection("img", "A", conf, b))
            .collect();
        let gt_refs: Vec<&Annotation> = gts.iter().collect();
        let det_refs: Vec<&Annotation> = dets.iter().collect();

        let matches = match_class(&det_refs, &gt_refs, threshold);

        prop_assert_eq!(matches.matches.len(), dets.len());
        prop_assert!(matches.total_tp() <= gts.len());
        prop_assert_eq!(matches.total_tp() + matches.total_fp(), dets.len());

        let mut claimed: Vec<usize> = matches
            .matches
            .iter()
            .filter(|m| m.is_true_positive)
            .filter_map(|m| m.ground_truth_index)
            .collect();
        let before = claimed.len();
        claimed.sort_unstable();
        claimed.dedup();
        prop_assert_eq!(claimed.len(), before);

        for pair in matches.matches.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
}

// Property: F1
proptest! {
    #[test]
    fn prop_f1_range(tp in 0usize..1000, fp in 0usize..1000, fn_ in 0usize..1000) {
        prop_assume!(tp + fp + fn_ > 0);
        let f1 = calculate_f1_from_counts(tp, fp, fn_).unwrap();
        prop_assert!((0.0..=1.0).contains(&f1), "F1 should be in [0,1], got {}", f1);
    }

    #[test]
    fn prop_f1_harmonic_mean(tp in 1usize..1000, fp in 0usize..1000, fn_ in 0usize..1000) {
        let precision = tp as f64 / (tp + fp) as f64;
        let recall = tp as f64 / (tp + fn_) as f64;
        let from_counts = calculate_f1_from_counts(tp, fp, fn_).unwrap();
        prop_assert!((calculate_f1_score(precision, recall) - from_counts).abs() < 1e-9);
    }
}

#[test]
fn test_eleven_point_levels_are_exact() {
    let levels = ElevenPointInterpolation::recall_levels();
    assert_eq!(levels.len(), 11);
    assert_eq!(levels[0], 1.0);
    assert_eq!(levels[7], 0.3);
    assert_eq!(levels[10], 0.0);
}
