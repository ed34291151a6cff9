//! F1 Score calculation.

use crate::error::{Result, VocEvalError};

/// Calculate F1 score from precision and recall.
///
/// F1 score is the harmonic mean of precision and recall:
/// F1 = 2 × (Precision × Recall) / (Precision + Recall)
///
/// Returns 0.0 if both precision and recall are 0.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::f1_score::calculate_f1_score;
///
/// let f1 = calculate_f1_score(0.8, 0.6);
/// assert!((f1 - 0.6857).abs() < 0.001);
/// ```
pub fn calculate_f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * (precision * recall) / (precision + recall)
}

/// Calculate F1 score directly from TP, FP, and FN counts.
///
/// Uses `2·TP / (2·TP + FP + FN)`, which equals the harmonic mean of
/// precision and recall whenever both are defined.
///
/// # Errors
///
/// Returns `UndefinedMetric("f1")` when all three counts are zero.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::f1_score::calculate_f1_from_counts;
///
/// let f1 = calculate_f1_from_counts(8, 2, 3).unwrap();
/// assert!((f1 - 0.7619).abs() < 0.001);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn calculate_f1_from_counts(
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
) -> Result<f64> {
    let denominator = 2 * true_positives + false_positives + false_negatives;
    if denominator == 0 {
        return Err(VocEvalError::UndefinedMetric("f1".to_string()));
    }

    let f1 = (2 * true_positives) as f64 / denominator as f64;

    debug_assert!(
        (0.0..=1.0).contains(&f1),
        "F1 must be between 0 and 1, got {f1}"
    );

    Ok(f1)
}

/// Round a metric to a fixed number of decimal places.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::f1_score::round_to;
///
/// assert_eq!(round_to(2.0 / 3.0, 3), 0.667);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
