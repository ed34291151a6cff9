//! Average Precision (AP) and mean Average Precision (mAP) calculation.
//!
//! Two interpolation strategies are provided behind the [`ApInterpolator`] trait:
//!
//! - [`EveryPointInterpolation`]: exact area under the monotonized
//!   precision-recall step curve (PASCAL VOC 2010 and later).
//! - [`ElevenPointInterpolation`]: mean of the interpolated precision at the
//!   recall levels 0.0, 0.1, ..., 1.0 (PASCAL VOC 2007).
//!
//! [`ApMethod`] selects one of them per evaluation call.

use serde::{Deserialize, Serialize};

/// Number of recall levels sampled by the 11-point method.
pub const ELEVEN_POINT_LEVELS: usize = 11;

/// AP value together with the interpolated curve used to compute it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpolatedAp {
    pub ap: f64,
    /// Interpolated precision values, aligned with `recall`
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    /// Indices into the padded recall array where recall changes value.
    /// Empty for the 11-point method.
    pub transitions: Vec<usize>,
}

/// Strategy converting a precision-recall curve into an AP value.
///
/// Inputs are same-length arrays in descending confidence order, so recall
/// is non-decreasing and precision is generally noisy.
pub trait ApInterpolator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn interpolate(&self, recall: &[f64], precision: &[f64]) -> InterpolatedAp;
}

/// All-point interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EveryPointInterpolation;

impl ApInterpolator for EveryPointInterpolation {
    fn name(&self) -> &'static str {
        "every-point"
    }

    /// # Example
    ///
    /// ```
    /// use voc_eval::metrics::ap::{ApInterpolator, EveryPointInterpolation};
    ///
    /// let result = EveryPointInterpolation.interpolate(&[1.0, 1.0], &[1.0, 0.5]);
    /// assert_eq!(result.ap, 1.0);
    /// assert_eq!(result.transitions, vec![1]);
    /// ```
    #[allow(clippy::float_cmp)]
    fn interpolate(&self, recall: &[f64], precision: &[f64]) -> InterpolatedAp {
        let mut mrec = Vec::with_capacity(recall.len() + 2);
        mrec.push(0.0);
        mrec.extend_from_slice(recall);
        mrec.push(1.0);

        let mut mpre = Vec::with_capacity(precision.len() + 2);
        mpre.push(0.0);
        mpre.extend_from_slice(precision);
        mpre.push(0.0);

        // Precision envelope: non-increasing from head to tail
        for i in (1..mpre.len()).rev() {
            mpre[i - 1] = mpre[i - 1].max(mpre[i]);
        }

        let transitions: Vec<usize> = (0..mrec.len() - 1)
            .filter(|&i| mrec[i + 1] != mrec[i])
            .map(|i| i + 1)
            .collect();

        let ap = transitions
            .iter()
            .map(|&i| (mrec[i] - mrec[i - 1]) * mpre[i])
            .sum();

        mpre.pop();
        mrec.pop();

        InterpolatedAp {
            ap,
            precision: mpre,
            recall: mrec,
            transitions,
        }
    }
}

/// 11-point interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevenPointInterpolation;

impl ElevenPointInterpolation {
    /// Recall levels in sampling order: 1.0, 0.9, ..., 0.0.
    ///
    /// Each level is `i / 10`, so 0.3 is exactly `0.3`, unlike numpy's
    /// `linspace(0, 1, 11)` where it is `0.30000000000000004`.
    #[allow(clippy::cast_precision_loss)]
    pub fn recall_levels() -> Vec<f64> {
        (0..ELEVEN_POINT_LEVELS)
            .rev()
            .map(|i| i as f64 / (ELEVEN_POINT_LEVELS - 1) as f64)
            .collect()
    }

    /// Maximum precision over all operating points with recall >= `level`.
    fn max_precision_from(recall: &[f64], precision: &[f64], level: f64) -> f64 {
        recall
            .iter()
            .position(|&r| r >= level)
            .map_or(0.0, |start| {
                precision[start..].iter().fold(0.0f64, |a, &b| a.max(b))
            })
    }
}

impl ApInterpolator for ElevenPointInterpolation {
    fn name(&self) -> &'static str {
        "11-point"
    }

    /// # Panics
    ///
    /// Panics if `precision` is shorter than `recall`.
    #[allow(clippy::cast_precision_loss)]
    fn interpolate(&self, recall: &[f64], precision: &[f64]) -> InterpolatedAp {
        assert!(
            precision.len() >= recall.len(),
            "precision ({}) must have an entry for every recall value ({})",
            precision.len(),
            recall.len()
        );

        let levels = Self::recall_levels();
        let rho: Vec<f64> = levels
            .iter()
            .map(|&level| Self::max_precision_from(recall, precision, level))
            .collect();

        let ap = rho.iter().sum::<f64>() / ELEVEN_POINT_LEVELS as f64;

        // Step curve for plotting: [l0, l0, ..., l10, 0] against [0, rho.., 0]
        let mut rvals = Vec::with_capacity(levels.len() + 2);
        rvals.push(levels[0]);
        rvals.extend_from_slice(&levels);
        rvals.push(0.0);

        let mut pvals = Vec::with_capacity(rho.len() + 2);
        pvals.push(0.0);
        pvals.extend_from_slice(&rho);
        pvals.push(0.0);

        let mut points: Vec<(f64, f64)> = Vec::with_capacity(rvals.len() * 2);
        for i in 0..rvals.len() {
            let previous = if i == 0 { pvals[pvals.len() - 1] } else { pvals[i - 1] };
            for point in [(rvals[i], previous), (rvals[i], pvals[i])] {
                if !points.contains(&point) {
                    points.push(point);
                }
            }
        }

        InterpolatedAp {
            ap,
            recall: points.iter().map(|&(r, _)| r).collect(),
            precision: points.iter().map(|&(_, p)| p).collect(),
            transitions: Vec::new(),
        }
    }
}

/// Selects the AP interpolation strategy for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApMethod {
    /// All-point interpolation
    #[default]
    EveryPoint,
    /// 11-point interpolation
    ElevenPoint,
}

impl ApMethod {
    /// The strategy implementing this method.
    pub fn interpolator(self) -> &'static dyn ApInterpolator {
        match self {
            ApMethod::EveryPoint => &EveryPointInterpolation,
            ApMethod::ElevenPoint => &ElevenPointInterpolation,
        }
    }
}

/// Calculate Average Precision from a precision-recall curve.
///
/// # Arguments
///
/// * `recalls` - Recall values in descending confidence order
/// * `precisions` - Precision values in descending confidence order
/// * `method` - Interpolation strategy
///
/// # Example
///
/// ```
/// use voc_eval::metrics::ap::{calculate_ap, ApMethod};
///
/// let recalls = vec![0.25, 0.5, 0.5, 0.75, 0.75];
/// let precisions = vec![1.0, 1.0, 0.67, 0.75, 0.6];
/// let ap = calculate_ap(&recalls, &precisions, ApMethod::EveryPoint);
/// assert!((ap - 0.6875).abs() < 1e-10);
/// ```
pub fn calculate_ap(recalls: &[f64], precisions: &[f64], method: ApMethod) -> f64 {
    method.interpolator().interpolate(recalls, precisions).ap
}

/// Calculate mean Average Precision (mAP) across multiple classes.
///
/// Returns 0.0 for an empty slice.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::ap::calculate_map;
///
/// let class_aps = vec![0.8, 0.9, 0.75, 0.85];
/// let map = calculate_map(&class_aps);
/// assert!((map - 0.825).abs() < 1e-10);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn calculate_map(class_aps: &[f64]) -> f64 {
    if class_aps.is_empty() {
        return 0.0;
    }

    class_aps.iter().sum::<f64>() / class_aps.len() as f64
}
