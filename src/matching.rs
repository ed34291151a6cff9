//! Detection matching utilities for evaluating predictions against ground truth.

use crate::metrics::iou::calculate_iou;
use crate::types::Annotation;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Represents a detection with the outcome of its matching pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub image_id: String,
    pub confidence: f64,
    /// Best IoU against the ground truth of the same image (0.0 if none)
    pub iou: f64,
    /// Position of the best ground truth within its image, if any overlapped
    pub ground_truth_index: Option<usize>,
    pub is_true_positive: bool,
}

/// Ground-truth boxes of one class grouped by image, with claimed flags.
///
/// The index is scratch state for a single class pass: a ground-truth box can
/// be claimed once, by the highest-confidence detection that reaches it.
#[derive(Debug)]
pub struct GroundTruthIndex<'a> {
    boxes: BTreeMap<&'a str, Vec<&'a Annotation>>,
    claimed: BTreeMap<&'a str, Vec<bool>>,
    total: usize,
}

impl<'a> GroundTruthIndex<'a> {
    /// Build the index, keeping input order within each image.
    pub fn new<I>(ground_truths: I) -> Self
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let boxes = group_by_image(ground_truths);
        let claimed = boxes
            .iter()
            .map(|(&image_id, anns)| (image_id, vec![false; anns.len()]))
            .collect();
        let total = boxes.values().map(Vec::len).sum();

        Self {
            boxes,
            claimed,
            total,
        }
    }

    /// Ground-truth boxes for an image, empty if the image has none.
    pub fn candidates(&self, image_id: &str) -> &[&'a Annotation] {
        self.boxes.get(image_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_claimed(&self, image_id: &str, index: usize) -> bool {
        self.claimed
            .get(image_id)
            .and_then(|flags| flags.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Claim a ground-truth box. Returns `false` if it was already claimed
    /// or does not exist.
    pub fn claim(&mut self, image_id: &str, index: usize) -> bool {
        match self.claimed.get_mut(image_id).and_then(|flags| flags.get_mut(index)) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    /// Total number of ground-truth boxes across all images.
    pub fn total_positives(&self) -> usize {
        self.total
    }

    /// Number of ground-truth boxes claimed so far.
    pub fn claimed_count(&self) -> usize {
        self.claimed
            .values()
            .map(|flags| flags.iter().filter(|&&f| f).count())
            .sum()
    }
}

/// Matching outcome for every detection of one class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMatches {
    /// One entry per detection, sorted by confidence (descending)
    pub matches: Vec<Match>,
    pub total_positives: usize,
}

impl ClassMatches {
    pub fn tp_flags(&self) -> Vec<bool> {
        self.matches.iter().map(|m| m.is_true_positive).collect()
    }

    pub fn fp_flags(&self) -> Vec<bool> {
        self.matches.iter().map(|m| !m.is_true_positive).collect()
    }

    pub fn total_tp(&self) -> usize {
        self.matches.iter().filter(|m| m.is_true_positive).count()
    }

    pub fn total_fp(&self) -> usize {
        self.matches.len() - self.total_tp()
    }
}

/// Sort detections by confidence (descending), keeping input order on ties.
pub fn sort_by_confidence<'a>(detections: &[&'a Annotation]) -> Vec<&'a Annotation> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Match detections of one class to its ground-truth boxes.
///
/// Uses greedy matching: detections are visited by descending confidence and
/// each is compared with every ground-truth box in its image. The box with the
/// highest IoU (first one on ties) is the candidate; the detection is a true
/// positive only if that IoU reaches `iou_threshold` and the candidate is
/// still unclaimed. A detection whose best candidate was already claimed is a
/// false positive; it does not fall back to the next-best box.
///
/// # Arguments
///
/// * `detections` - Detections of one class across all images
/// * `ground_truths` - Ground-truth boxes of the same class across all images
/// * `iou_threshold` - Minimum IoU to consider a match
///
/// # Returns
///
/// Returns one `Match` per detection, sorted by confidence (descending).
pub fn match_class(
    detections: &[&Annotation],
    ground_truths: &[&Annotation],
    iou_threshold: f64,
) -> ClassMatches {
    let mut index = GroundTruthIndex::new(ground_truths.iter().copied());

    let matches = sort_by_confidence(detections)
        .into_iter()
        .map(|det| match_detection(det, &mut index, iou_threshold))
        .collect();

    ClassMatches {
        matches,
        total_positives: index.total_positives(),
    }
}

fn match_detection(
    detection: &Annotation,
    index: &mut GroundTruthIndex<'_>,
    iou_threshold: f64,
) -> Match {
    let mut best_iou = 0.0;
    let mut best_gt_idx: Option<usize> = None;

    for (gt_idx, gt) in index.candidates(&detection.image_id).iter().enumerate() {
        let iou = calculate_iou(&detection.bbox, &gt.bbox);
        if iou > best_iou {
            best_iou = iou;
            best_gt_idx = Some(gt_idx);
        }
    }

    let is_tp = match best_gt_idx {
        Some(gt_idx) if best_iou >= iou_threshold => index.claim(&detection.image_id, gt_idx),
        _ => false,
    };

    Match {
        image_id: detection.image_id.clone(),
        confidence: detection.confidence,
        iou: best_iou,
        ground_truth_index: best_gt_idx,
        is_true_positive: is_tp,
    }
}

/// Group annotations by image_id, keeping input order within each image.
pub fn group_by_image<'a, I>(annotations: I) -> BTreeMap<&'a str, Vec<&'a Annotation>>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    let mut groups: BTreeMap<&'a str, Vec<&'a Annotation>> = BTreeMap::new();

    for annotation in annotations {
        groups
            .entry(annotation.image_id.as_str())
            .or_default()
            .push(annotation);
    }

    groups
}
