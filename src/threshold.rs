//! Confidence score thresholding utilities.

use crate::error::{Result, VocEvalError};
use crate::types::Annotation;

/// Filter annotations by confidence score threshold.
///
/// # Arguments
///
/// * `annotations` - Annotations to filter
/// * `threshold` - Minimum confidence score (0.0 to 1.0)
///
/// # Returns
///
/// Returns references to the annotations with confidence >= threshold, in input order.
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
///
/// # Example
///
/// ```
/// use voc_eval::threshold::filter_by_confidence;
/// use voc_eval::types::{Annotation, BoundingBox};
///
/// let annotations = vec![
///     Annotation::detection("img1", "car", 0.9, BoundingBox::new(10.0, 20.0, 30.0, 40.0)),
///     Annotation::detection("img1", "car", 0.3, BoundingBox::new(50.0, 60.0, 70.0, 80.0)),
/// ];
///
/// let filtered = filter_by_confidence(&annotations, 0.5).unwrap();
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_confidence<'a, I>(annotations: I, threshold: f64) -> Result<Vec<&'a Annotation>>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    validate_threshold(threshold)?;

    Ok(annotations
        .into_iter()
        .filter(|ann| meets_threshold(ann.confidence, threshold))
        .collect())
}

/// Whether a confidence score passes a threshold. Thresholds are inclusive.
#[inline]
pub fn meets_threshold(confidence: f64, threshold: f64) -> bool {
    confidence >= threshold
}

/// Generate a range of threshold values for evaluation.
///
/// Values are computed as `start + (end - start) * i / (steps - 1)` so that
/// decimal levels such as 0.3 come out exactly.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Example
///
/// ```
/// use voc_eval::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 11).unwrap();
/// assert_eq!(thresholds.len(), 11);
/// assert_eq!(thresholds[3], 0.3);
/// assert_eq!(thresholds[10], 1.0);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(VocEvalError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string(),
        ));
    }

    validate_threshold(start)?;
    validate_threshold(end)?;

    if start > end {
        return Err(VocEvalError::InvalidThreshold(format!(
            "Start threshold ({start}) must be <= end threshold ({end})"
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let span = end - start;
    let divisions = (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| start + span * i as f64 / divisions)
        .collect())
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(VocEvalError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}
