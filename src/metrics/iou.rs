//! Intersection over Union (IoU) calculation.
//!
//! Areas use the inclusive pixel-edge convention `(x2 - x1 + 1) * (y2 - y1 + 1)`,
//! matching pixel-indexed annotation formats such as PASCAL VOC.

use crate::types::BoundingBox;

/// Check whether two boxes overlap or touch.
///
/// Returns `false` when `a` lies strictly right of, left of, above, or below `b`.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::iou::boxes_intersect;
/// use voc_eval::types::BoundingBox;
///
/// let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let b = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
/// assert!(boxes_intersect(&a, &b));
/// ```
pub fn boxes_intersect(a: &BoundingBox, b: &BoundingBox) -> bool {
    if a.x1 > b.x2 {
        return false;
    }
    if b.x1 > a.x2 {
        return false;
    }
    if a.y2 < b.y1 {
        return false;
    }
    if a.y1 > b.y2 {
        return false;
    }
    true
}

/// Area of the clipped rectangle shared by two boxes.
///
/// Only meaningful when [`boxes_intersect`] holds.
pub fn intersection_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x_left = a.x1.max(b.x1);
    let y_top = a.y1.max(b.y1);
    let x_right = a.x2.min(b.x2);
    let y_bottom = a.y2.min(b.y2);

    (x_right - x_left + 1.0) * (y_bottom - y_top + 1.0)
}

/// Inclusive pixel area of a box.
pub fn area(bbox: &BoundingBox) -> f64 {
    (bbox.x2 - bbox.x1 + 1.0) * (bbox.y2 - bbox.y1 + 1.0)
}

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Panics
///
/// Panics if the ratio comes out negative, which requires malformed boxes.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::iou::calculate_iou;
/// use voc_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 9.0, 9.0);
/// let bbox2 = BoundingBox::new(5.0, 5.0, 14.0, 14.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!((iou - 25.0 / 175.0).abs() < 1e-12);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    if !boxes_intersect(bbox1, bbox2) {
        return 0.0;
    }

    let inter = intersection_area(bbox1, bbox2);
    let union = area(bbox1) + area(bbox2) - inter;
    let iou = inter / union;

    assert!(iou >= 0.0, "IoU must be non-negative, got {iou}");
    iou
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// # Returns
///
/// Returns a 2D vector where `result[i][j]` is the IoU between `bboxes1[i]` and `bboxes2[j]`.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::iou::calculate_iou_matrix;
/// use voc_eval::types::BoundingBox;
///
/// let bboxes1 = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let bboxes2 = vec![BoundingBox::new(5.0, 5.0, 15.0, 15.0)];
/// let iou_matrix = calculate_iou_matrix(&bboxes1, &bboxes2);
/// assert_eq!(iou_matrix.len(), 1);
/// assert_eq!(iou_matrix[0].len(), 1);
/// ```
pub fn calculate_iou_matrix(bboxes1: &[BoundingBox], bboxes2: &[BoundingBox]) -> Vec<Vec<f64>> {
    bboxes1
        .iter()
        .map(|bbox1| {
            bboxes2
                .iter()
                .map(|bbox2| calculate_iou(bbox1, bbox2))
                .collect()
        })
        .collect()
}
