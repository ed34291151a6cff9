//! Precision and Recall calculation.

use crate::error::{Result, VocEvalError};
use serde::{Deserialize, Serialize};

/// Container for precision and recall values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl PrecisionRecall {
    /// Calculate precision and recall from TP, FP, and FN counts.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedMetric("precision")` when there are no detections and
    /// `UndefinedMetric("recall")` when there are no positives.
    ///
    /// # Example
    ///
    /// ```
    /// use voc_eval::metrics::precision_recall::PrecisionRecall;
    ///
    /// let pr = PrecisionRecall::from_counts(8, 2, 3).unwrap();
    /// assert_eq!(pr.precision, 0.8); // 8 / (8 + 2)
    /// assert!((pr.recall - 0.7272).abs() < 0.001); // 8 / (8 + 3)
    /// ```
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
    ) -> Result<Self> {
        let precision = ratio(true_positives, true_positives + false_positives, "precision")?;
        let recall = ratio(true_positives, true_positives + false_negatives, "recall")?;

        Ok(Self {
            precision,
            recall,
            true_positives,
            false_positives,
            false_negatives,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize, metric: &str) -> Result<f64> {
    if denominator == 0 {
        return Err(VocEvalError::UndefinedMetric(metric.to_string()));
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Cumulative precision and recall over a confidence-ordered detection list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    /// Running true positive count after each detection
    pub acc_tp: Vec<usize>,
    /// Running false positive count after each detection
    pub acc_fp: Vec<usize>,
}

impl PrecisionRecallCurve {
    pub fn len(&self) -> usize {
        self.precision.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precision.is_empty()
    }
}

/// Build the precision-recall curve from TP flags sorted by confidence.
///
/// Every entry that is not a true positive counts as a false positive.
///
/// # Arguments
///
/// * `is_true_positive` - TP flag per detection, highest confidence first
/// * `total_positives` - Number of ground-truth boxes (recall denominator)
///
/// # Errors
///
/// Returns `UndefinedMetric("recall")` if `total_positives` is zero.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::precision_recall::build_curve;
///
/// let curve = build_curve(&[true, false], 1).unwrap();
/// assert_eq!(curve.recall, vec![1.0, 1.0]);
/// assert_eq!(curve.precision, vec![1.0, 0.5]);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn build_curve(is_true_positive: &[bool], total_positives: usize) -> Result<PrecisionRecallCurve> {
    if total_positives == 0 {
        return Err(VocEvalError::UndefinedMetric("recall".to_string()));
    }

    let mut curve = PrecisionRecallCurve {
        precision: Vec::with_capacity(is_true_positive.len()),
        recall: Vec::with_capacity(is_true_positive.len()),
        acc_tp: Vec::with_capacity(is_true_positive.len()),
        acc_fp: Vec::with_capacity(is_true_positive.len()),
    };

    let mut tp = 0usize;
    let mut fp = 0usize;

    for &is_tp in is_true_positive {
        if is_tp {
            tp += 1;
        } else {
            fp += 1;
        }

        curve.acc_tp.push(tp);
        curve.acc_fp.push(fp);
        curve.recall.push(tp as f64 / total_positives as f64);
        curve.precision.push(tp as f64 / (tp + fp) as f64);
    }

    Ok(curve)
}
