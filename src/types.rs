//! Core data types for annotations and evaluation results.

use crate::metrics::ap::ApMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An axis-aligned bounding box in absolute corner format (x1, y1, x2, y2).
///
/// Coordinates are pixel indices: `x1 <= x2` and `y1 <= y2`. The engine does
/// not validate this; see [`BoundingBox::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal extent (`x2 - x1`).
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Vertical extent (`y2 - y1`).
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Check that the corners are ordered.
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

/// Whether a box is an annotation or a model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxKind {
    GroundTruth,
    Detection,
}

/// A box tagged with its image, class, confidence and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub image_id: String,
    pub class_id: String,
    /// Confidence score; 1.0 for ground truth unless a reference detector supplied one
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub kind: BoxKind,
}

impl Annotation {
    /// Create a ground-truth annotation with confidence 1.0.
    pub fn ground_truth(
        image_id: impl Into<String>,
        class_id: impl Into<String>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            class_id: class_id.into(),
            confidence: 1.0,
            bbox,
            kind: BoxKind::GroundTruth,
        }
    }

    /// Create a detection with a confidence score.
    pub fn detection(
        image_id: impl Into<String>,
        class_id: impl Into<String>,
        confidence: f64,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            class_id: class_id.into(),
            confidence,
            bbox,
            kind: BoxKind::Detection,
        }
    }

    /// Replace the confidence score.
    ///
    /// Reference-detector boxes are tagged as ground truth but keep the score
    /// they were produced with, so relative metrics can filter them.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn is_ground_truth(&self) -> bool {
        self.kind == BoxKind::GroundTruth
    }

    pub fn is_detection(&self) -> bool {
        self.kind == BoxKind::Detection
    }
}

/// A normalized collection of ground-truth and detected boxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxes {
    boxes: Vec<Annotation>,
}

impl BoundingBoxes {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.boxes.push(annotation);
    }

    /// Add a ground-truth box.
    pub fn add_ground_truth(
        &mut self,
        image_id: impl Into<String>,
        class_id: impl Into<String>,
        bbox: BoundingBox,
    ) {
        self.push(Annotation::ground_truth(image_id, class_id, bbox));
    }

    /// Add a detected box.
    pub fn add_detection(
        &mut self,
        image_id: impl Into<String>,
        class_id: impl Into<String>,
        confidence: f64,
        bbox: BoundingBox,
    ) {
        self.push(Annotation::detection(image_id, class_id, confidence, bbox));
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Iterate over all boxes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.boxes.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.boxes
    }

    /// Ground-truth boxes in insertion order.
    pub fn ground_truths(&self) -> impl Iterator<Item = &Annotation> {
        self.boxes.iter().filter(|ann| ann.is_ground_truth())
    }

    /// Detected boxes in insertion order.
    pub fn detections(&self) -> impl Iterator<Item = &Annotation> {
        self.boxes.iter().filter(|ann| ann.is_detection())
    }

    /// Distinct class labels from either side, in ascending order.
    pub fn class_ids(&self) -> Vec<String> {
        self.boxes
            .iter()
            .map(|ann| ann.class_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct image identifiers from either side, in ascending order.
    pub fn image_ids(&self) -> Vec<String> {
        self.boxes
            .iter()
            .map(|ann| ann.image_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<Annotation> for BoundingBoxes {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self {
            boxes: iter.into_iter().collect(),
        }
    }
}

impl Extend<Annotation> for BoundingBoxes {
    fn extend<I: IntoIterator<Item = Annotation>>(&mut self, iter: I) {
        self.boxes.extend(iter);
    }
}

impl IntoIterator for BoundingBoxes {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl<'a> IntoIterator for &'a BoundingBoxes {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

/// Metrics for a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassResult {
    pub class_id: String,
    /// Precision after each detection, in descending confidence order
    pub precision: Vec<f64>,
    /// Recall after each detection, in descending confidence order
    pub recall: Vec<f64>,
    /// Average precision
    pub ap: f64,
    /// Interpolated precision curve for display
    pub interpolated_precision: Vec<f64>,
    /// Interpolated recall curve for display
    pub interpolated_recall: Vec<f64>,
    /// Number of ground-truth boxes of this class
    pub total_positives: usize,
    pub total_tp: usize,
    pub total_fp: usize,
}

/// Result of a full evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Per-class results, ordered by class label
    pub classes: Vec<ClassResult>,
    /// Mean of per-class AP
    pub map: f64,
    pub method: ApMethod,
    pub iou_threshold: f64,
}

impl EvaluationReport {
    /// Look up the result for one class.
    pub fn class(&self, class_id: &str) -> Option<&ClassResult> {
        self.classes.iter().find(|result| result.class_id == class_id)
    }

    /// Per-class AP values as `(class_id, ap)` pairs.
    pub fn ap_per_class(&self) -> Vec<(&str, f64)> {
        self.classes
            .iter()
            .map(|result| (result.class_id.as_str(), result.ap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_truth_defaults_to_full_confidence() {
        let ann = Annotation::ground_truth("img1", "A", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(ann.confidence, 1.0);
        assert!(ann.is_ground_truth());
    }

    #[test]
    fn test_with_confidence_keeps_kind() {
        let ann = Annotation::ground_truth("img1", "A", BoundingBox::new(0.0, 0.0, 10.0, 10.0))
            .with_confidence(0.4);
        assert_eq!(ann.confidence, 0.4);
        assert_eq!(ann.kind, BoxKind::GroundTruth);
    }

    #[test]
    fn test_class_and_image_ids_sorted() {
        let mut boxes = BoundingBoxes::new();
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        boxes.add_ground_truth("img2", "dog", bbox);
        boxes.add_detection("img1", "cat", 0.5, bbox);
        boxes.add_detection("img2", "dog", 0.7, bbox);

        assert_eq!(boxes.class_ids(), vec!["cat".to_string(), "dog".to_string()]);
        assert_eq!(boxes.image_ids(), vec!["img1".to_string(), "img2".to_string()]);
        assert_eq!(boxes.ground_truths().count(), 1);
        assert_eq!(boxes.detections().count(), 2);
    }

    #[test]
    fn test_bbox_validity() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(BoundingBox::new(5.0, 5.0, 5.0, 5.0).is_valid());
        assert!(!BoundingBox::new(10.0, 0.0, 0.0, 10.0).is_valid());
    }
}
