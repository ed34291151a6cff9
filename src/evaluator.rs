//! Main evaluation orchestrator for PASCAL VOC style detection metrics.

use crate::config::{EvaluationConfig, MissingPositives, Validate};
use crate::error::{Result, VocEvalError};
use crate::matching::match_class;
use crate::metrics::ap::{calculate_map, ApMethod};
use crate::metrics::precision_recall::build_curve;
use crate::types::{Annotation, BoundingBoxes, ClassResult, EvaluationReport};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Detections and ground truth of one class.
#[derive(Debug, Default)]
struct ClassBoxes<'a> {
    detections: Vec<&'a Annotation>,
    ground_truths: Vec<&'a Annotation>,
}

/// Evaluate detections against ground truth, one independent pass per class.
///
/// Classes are the distinct labels found on either side. For every class the
/// detections are matched greedily to ground truth, the precision-recall
/// curve is built and AP is computed with the configured interpolation
/// method. The mAP is the mean AP of the returned classes.
///
/// # Arguments
///
/// * `boxes` - Ground-truth and detected boxes
/// * `config` - IoU threshold, AP method and missing-positives policy
///
/// # Returns
///
/// Returns an `EvaluationReport` with per-class results sorted by class label.
///
/// # Errors
///
/// * `EmptyDataset` if the collection holds no boxes
/// * `NoPositives` if a class has no ground truth and the policy is `Error`
/// * `InvalidThreshold` if the IoU threshold is outside [0, 1]
///
/// # Example
///
/// ```
/// use voc_eval::config::EvaluationConfig;
/// use voc_eval::evaluator::evaluate;
/// use voc_eval::types::{BoundingBox, BoundingBoxes};
///
/// let mut boxes = BoundingBoxes::new();
/// boxes.add_ground_truth("img1", "A", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
/// boxes.add_detection("img1", "A", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
/// boxes.add_detection("img1", "A", 0.8, BoundingBox::new(20.0, 20.0, 30.0, 30.0));
///
/// let report = evaluate(&boxes, &EvaluationConfig::default()).unwrap();
/// let class_a = report.class("A").unwrap();
/// assert_eq!(class_a.precision, vec![1.0, 0.5]);
/// assert_eq!(class_a.ap, 1.0);
/// ```
pub fn evaluate(boxes: &BoundingBoxes, config: &EvaluationConfig) -> Result<EvaluationReport> {
    evaluate_annotations(boxes.iter(), config)
}

/// Same as [`evaluate`], for any borrowed sequence of annotations.
pub fn evaluate_annotations<'a, I>(annotations: I, config: &EvaluationConfig) -> Result<EvaluationReport>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    config.validate()?;

    let by_class = split_by_class(annotations);
    if by_class.is_empty() {
        return Err(VocEvalError::EmptyDataset(
            "No boxes found in collection".to_string(),
        ));
    }

    let groups: Vec<(&str, ClassBoxes<'_>)> = by_class.into_iter().collect();
    let outcomes = evaluate_groups(&groups, config)?;

    let classes: Vec<ClassResult> = outcomes.into_iter().flatten().collect();
    let aps: Vec<f64> = classes.iter().map(|result| result.ap).collect();
    let map = calculate_map(&aps);

    info!(
        classes = classes.len(),
        map,
        method = config.method.interpolator().name(),
        iou_threshold = config.iou_threshold,
        "evaluation finished"
    );

    Ok(EvaluationReport {
        classes,
        map,
        method: config.method,
        iou_threshold: config.iou_threshold,
    })
}

/// Evaluate at a specific IoU threshold with the default AP method.
pub fn evaluate_at_iou(boxes: &BoundingBoxes, iou_threshold: f64) -> Result<EvaluationReport> {
    evaluate(boxes, &EvaluationConfig::new(iou_threshold, ApMethod::default()))
}

/// Evaluate a single class.
///
/// # Errors
///
/// Returns `NoPositives` if `ground_truths` is empty.
pub fn evaluate_class(
    class_id: &str,
    detections: &[&Annotation],
    ground_truths: &[&Annotation],
    config: &EvaluationConfig,
) -> Result<ClassResult> {
    if ground_truths.is_empty() {
        return Err(VocEvalError::NoPositives(class_id.to_string()));
    }

    let matches = match_class(detections, ground_truths, config.iou_threshold);
    let curve = build_curve(&matches.tp_flags(), matches.total_positives)?;
    let interpolated = config
        .method
        .interpolator()
        .interpolate(&curve.recall, &curve.precision);

    let total_tp = matches.total_tp();
    let total_fp = matches.total_fp();

    debug!(
        class_id,
        detections = detections.len(),
        total_positives = matches.total_positives,
        total_tp,
        total_fp,
        ap = interpolated.ap,
        "class evaluated"
    );

    Ok(ClassResult {
        class_id: class_id.to_string(),
        precision: curve.precision,
        recall: curve.recall,
        ap: interpolated.ap,
        interpolated_precision: interpolated.precision,
        interpolated_recall: interpolated.recall,
        total_positives: matches.total_positives,
        total_tp,
        total_fp,
    })
}

fn split_by_class<'a, I>(annotations: I) -> BTreeMap<&'a str, ClassBoxes<'a>>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    let mut by_class: BTreeMap<&'a str, ClassBoxes<'a>> = BTreeMap::new();

    for ann in annotations {
        let entry = by_class.entry(ann.class_id.as_str()).or_default();
        if ann.is_ground_truth() {
            entry.ground_truths.push(ann);
        } else {
            entry.detections.push(ann);
        }
    }

    by_class
}

/// Evaluate one class, applying the missing-positives policy.
fn evaluate_group(
    class_id: &str,
    boxes: &ClassBoxes<'_>,
    config: &EvaluationConfig,
) -> Result<Option<ClassResult>> {
    if boxes.ground_truths.is_empty() && config.missing_positives == MissingPositives::Skip {
        warn!(
            class_id,
            detections = boxes.detections.len(),
            "skipping class without ground truth"
        );
        return Ok(None);
    }

    evaluate_class(class_id, &boxes.detections, &boxes.ground_truths, config).map(Some)
}

#[cfg(feature = "parallel")]
fn evaluate_groups(
    groups: &[(&str, ClassBoxes<'_>)],
    config: &EvaluationConfig,
) -> Result<Vec<Option<ClassResult>>> {
    groups
        .par_iter()
        .map(|(class_id, boxes)| evaluate_group(class_id, boxes, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_groups(
    groups: &[(&str, ClassBoxes<'_>)],
    config: &EvaluationConfig,
) -> Result<Vec<Option<ClassResult>>> {
    groups
        .iter()
        .map(|(class_id, boxes)| evaluate_group(class_id, boxes, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn single_class_boxes() -> BoundingBoxes {
        let mut boxes = BoundingBoxes::new();
        boxes.add_ground_truth("img1", "A", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        boxes.add_detection("img1", "A", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        boxes.add_detection("img1", "A", 0.8, BoundingBox::new(20.0, 20.0, 30.0, 30.0));
        boxes
    }

    #[test]
    fn test_evaluate_basic() {
        let report = evaluate(&single_class_boxes(), &EvaluationConfig::default()).unwrap();
        assert_eq!(report.classes.len(), 1);

        let result = &report.classes[0];
        assert_eq!(result.total_tp, 1);
        assert_eq!(result.total_fp, 1);
        assert_eq!(result.recall, vec![1.0, 1.0]);
        assert_eq!(result.precision, vec![1.0, 0.5]);
        assert_eq!(result.ap, 1.0);
        assert_eq!(report.map, 1.0);
    }

    #[test]
    fn test_empty_collection() {
        let result = evaluate(&BoundingBoxes::new(), &EvaluationConfig::default());
        assert!(matches!(result, Err(VocEvalError::EmptyDataset(_))));
    }

    #[test]
    fn test_no_positives_error_names_class() {
        let mut boxes = single_class_boxes();
        boxes.add_detection("img1", "B", 0.6, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        match evaluate(&boxes, &EvaluationConfig::default()) {
            Err(VocEvalError::NoPositives(class_id)) => assert_eq!(class_id, "B"),
            other => panic!("Expected NoPositives, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_policy_excludes_class() {
        let mut boxes = single_class_boxes();
        boxes.add_detection("img1", "B", 0.6, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        let config = EvaluationConfig::default().with_missing_positives(MissingPositives::Skip);
        let report = evaluate(&boxes, &config).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert!(report.class("B").is_none());
        assert_eq!(report.map, 1.0);
    }

    #[test]
    fn test_evaluate_at_iou() {
        let report = evaluate_at_iou(&single_class_boxes(), 0.75).unwrap();
        assert_eq!(report.iou_threshold, 0.75);
        assert_eq!(report.method, ApMethod::EveryPoint);
    }
}
