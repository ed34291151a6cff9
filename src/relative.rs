//! Metrics relative to a reference detector.
//!
//! When no human annotation exists, the output of a more accurate detector
//! can stand in for ground truth. Boxes of kind `GroundTruth` are the
//! reference, boxes of kind `Detection` are the detector being evaluated.
//! Both sides are restricted to a class whitelist and filtered by their own
//! confidence threshold before any matching happens.

pub use crate::config::RelativeConfig;

use crate::config::{DetectedFrameRule, Validate};
use crate::error::{Result, VocEvalError};
use crate::evaluator::evaluate_annotations;
use crate::metrics::f1_score::{calculate_f1_from_counts, round_to};
use crate::metrics::iou::calculate_iou_matrix;
use crate::metrics::precision_recall::PrecisionRecall;
use crate::stats::FrameStats;
use crate::threshold::meets_threshold;
use crate::types::{Annotation, BoundingBox, BoundingBoxes, ClassResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Counts and F1 metrics over a set of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeF1 {
    pub total_tp: usize,
    pub total_fp: usize,
    pub total_fn: usize,
    /// Number of reference boxes considered
    pub total_count: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// F1 over all frames and over detected frames only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeF1Report {
    #[serde(rename = "All Frames F1")]
    pub all_frames: RelativeF1,
    #[serde(rename = "Detected Frames F1")]
    pub detected_frames: RelativeF1,
    #[serde(rename = "Stats")]
    pub stats: FrameStats,
}

/// Aggregate record appended to relative mAP results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    #[serde(rename = "mAP")]
    pub map: f64,
    /// Number of classes the mean is taken over
    #[serde(rename = "classes")]
    pub class_count: usize,
}

/// Per-class AP against the reference, plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeMapReport {
    pub classes: Vec<ClassResult>,
    pub summary: MapSummary,
    pub stats: FrameStats,
}

/// Filtered boxes of one frame.
#[derive(Debug, Default)]
struct Frame<'a> {
    reference: Vec<&'a Annotation>,
    evaluated: Vec<&'a Annotation>,
    /// Any raw detection at all, before class and confidence filtering
    any_detection: bool,
}

impl Frame<'_> {
    fn is_detected(&self, rule: DetectedFrameRule) -> bool {
        match rule {
            DetectedFrameRule::FilteredDetections => !self.evaluated.is_empty(),
            DetectedFrameRule::AnyDetection => self.any_detection,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
    count: usize,
}

impl std::ops::Add for FrameCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
            count: self.count + other.count,
        }
    }
}

/// Split boxes into frames, applying the whitelist and confidence thresholds.
///
/// `rule` decides which frames the returned stats count as detected.
fn partition<'a>(
    boxes: &'a BoundingBoxes,
    config: &RelativeConfig,
    rule: DetectedFrameRule,
) -> (BTreeMap<&'a str, Frame<'a>>, FrameStats) {
    let mut frames: BTreeMap<&'a str, Frame<'a>> = BTreeMap::new();

    for ann in boxes {
        let frame = frames.entry(ann.image_id.as_str()).or_default();
        let whitelisted = config.is_whitelisted(&ann.class_id);

        if ann.is_ground_truth() {
            if whitelisted && meets_threshold(ann.confidence, config.confidence_gt) {
                frame.reference.push(ann);
            }
        } else {
            frame.any_detection = true;
            if whitelisted && meets_threshold(ann.confidence, config.confidence_det) {
                frame.evaluated.push(ann);
            }
        }
    }

    let mut stats = FrameStats::new();
    for frame in frames.values() {
        stats.add_frame(!frame.reference.is_empty(), !frame.evaluated.is_empty());
        if frame.is_detected(rule) {
            stats.mark_detected();
        }
    }

    if stats.detected_frames == 0 {
        warn!(
            total_frames = stats.total_frames,
            rule = ?rule,
            "no detected frames"
        );
    }

    (frames, stats)
}

/// TP/FP/FN for one frame.
///
/// A detection is a TP if any reference box overlaps it at the threshold;
/// several detections may hit the same reference box. A reference box that
/// no detection reaches is a FN.
fn count_frame(frame: &Frame<'_>, iou_threshold: f64) -> FrameCounts {
    let evaluated: Vec<BoundingBox> = frame.evaluated.iter().map(|ann| ann.bbox).collect();
    let reference: Vec<BoundingBox> = frame.reference.iter().map(|ann| ann.bbox).collect();
    let ious = calculate_iou_matrix(&evaluated, &reference);

    let tp = ious
        .iter()
        .filter(|row| row.iter().any(|&iou| iou >= iou_threshold))
        .count();
    let fn_ = (0..reference.len())
        .filter(|&j| !ious.iter().any(|row| row[j] >= iou_threshold))
        .count();

    FrameCounts {
        tp,
        fp: evaluated.len() - tp,
        fn_,
        count: reference.len(),
    }
}

fn summarize<'f, 'a: 'f, I>(frames: I, config: &RelativeConfig) -> Result<RelativeF1>
where
    I: IntoIterator<Item = &'f Frame<'a>>,
{
    let counts = frames
        .into_iter()
        .map(|frame| count_frame(frame, config.iou_threshold))
        .fold(FrameCounts::default(), |acc, c| acc + c);

    let pr = PrecisionRecall::from_counts(counts.tp, counts.fp, counts.fn_)?;
    let f1 = calculate_f1_from_counts(counts.tp, counts.fp, counts.fn_)?;
    let round = |value: f64| config.decimals.map_or(value, |d| round_to(value, d));

    Ok(RelativeF1 {
        total_tp: counts.tp,
        total_fp: counts.fp,
        total_fn: counts.fn_,
        total_count: counts.count,
        precision: round(pr.precision),
        recall: round(pr.recall),
        f1: round(f1),
    })
}

/// F1 of a detector relative to a reference detector.
///
/// Two variants are computed: over every frame in the collection, and over
/// the frames the evaluated detector covered (see [`DetectedFrameRule`]), so
/// a detector is not penalized for frames it never processed.
///
/// # Errors
///
/// * `InvalidConfig` / `InvalidThreshold` if the configuration is unusable
/// * `UndefinedMetric` naming `precision`, `recall` or `f1` when a variant
///   has a zero denominator
///
/// # Example
///
/// ```
/// use voc_eval::config::RelativeConfig;
/// use voc_eval::relative::relative_f1;
/// use voc_eval::types::{BoundingBox, BoundingBoxes};
///
/// let mut boxes = BoundingBoxes::new();
/// boxes.add_ground_truth("frame1", "car", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
/// boxes.add_ground_truth("frame2", "car", BoundingBox::new(0.0, 0.0, 10.0, 10.0));
/// boxes.add_detection("frame1", "car", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
///
/// let report = relative_f1(&boxes, &RelativeConfig::new(["car"])).unwrap();
/// assert_eq!(report.all_frames.f1, 0.667);
/// assert_eq!(report.detected_frames.f1, 1.0);
/// ```
pub fn relative_f1(boxes: &BoundingBoxes, config: &RelativeConfig) -> Result<RelativeF1Report> {
    config.validate()?;

    let (frames, stats) = partition(boxes, config, config.detected_frames);
    stats.log_summary();

    let all_frames = summarize(frames.values(), config)?;
    let detected_frames = summarize(
        frames
            .values()
            .filter(|frame| frame.is_detected(config.detected_frames)),
        config,
    )?;

    info!(
        all_frames_f1 = all_frames.f1,
        detected_frames_f1 = detected_frames.f1,
        "relative F1 computed"
    );

    Ok(RelativeF1Report {
        all_frames,
        detected_frames,
        stats,
    })
}

/// mAP of a detector relative to a reference detector.
///
/// Frames that are not detected under `config.map_detected_frames` are
/// dropped from both sides, then the remaining boxes go through the regular
/// per-class AP pipeline with the reference boxes as ground truth. By default
/// a frame is kept when the evaluated detector produced any box in it, even
/// one that the class or confidence filter removes.
///
/// # Errors
///
/// * `EmptyDataset` if no box survives filtering
/// * `NoPositives` if a class has evaluated boxes but no reference boxes and
///   the policy is `Error`
pub fn relative_map(boxes: &BoundingBoxes, config: &RelativeConfig) -> Result<RelativeMapReport> {
    config.validate()?;

    let (frames, stats) = partition(boxes, config, config.map_detected_frames);
    stats.log_summary();

    let kept: Vec<Annotation> = frames
        .values()
        .filter(|frame| frame.is_detected(config.map_detected_frames))
        .flat_map(|frame| {
            let reference = frame
                .reference
                .iter()
                .map(|&ann| ann.clone().with_confidence(1.0));
            let evaluated = frame.evaluated.iter().map(|&ann| ann.clone());
            reference.chain(evaluated)
        })
        .collect();

    debug!(kept = kept.len(), "boxes kept for relative mAP");

    let report = evaluate_annotations(kept.iter(), &config.evaluation_config()).map_err(|err| {
        match err {
            VocEvalError::EmptyDataset(_) => VocEvalError::EmptyDataset(
                "No whitelisted boxes left in detected frames".to_string(),
            ),
            other => other,
        }
    })?;

    let summary = MapSummary {
        map: report.map,
        class_count: report.classes.len(),
    };

    info!(map = summary.map, classes = summary.class_count, "relative mAP computed");

    Ok(RelativeMapReport {
        classes: report.classes,
        summary,
        stats,
    })
}
