//! Evaluation configuration and JSON loading.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"method": "eleven_point"}` is a complete configuration.

use crate::error::{Result, VocEvalError};
use crate::metrics::ap::ApMethod;
use crate::threshold::validate_threshold;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default IoU threshold for a detection to match a ground-truth box.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Default confidence threshold applied to both sides of a relative comparison.
pub const DEFAULT_RELATIVE_CONFIDENCE: f64 = 0.2;

/// Default number of decimals kept in relative F1 metrics.
pub const DEFAULT_RELATIVE_DECIMALS: u32 = 3;

/// How to treat a class that has detections but no ground-truth boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPositives {
    /// Fail the evaluation with `NoPositives`
    #[default]
    Error,
    /// Leave the class out of the results and the mAP
    Skip,
}

/// Which frames count as "detected" in relative metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedFrameRule {
    /// At least one evaluated box of a whitelisted class survives confidence filtering
    #[default]
    FilteredDetections,
    /// At least one evaluated box of any class, before filtering
    AnyDetection,
}

/// Configuration checked before an evaluation runs.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parameters for the per-class AP evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub iou_threshold: f64,
    pub method: ApMethod,
    pub missing_positives: MissingPositives,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            method: ApMethod::default(),
            missing_positives: MissingPositives::default(),
        }
    }
}

impl EvaluationConfig {
    pub fn new(iou_threshold: f64, method: ApMethod) -> Self {
        Self {
            iou_threshold,
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_missing_positives(mut self, policy: MissingPositives) -> Self {
        self.missing_positives = policy;
        self
    }
}

impl Validate for EvaluationConfig {
    fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)
    }
}

/// Parameters for comparing a detector against a reference detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeConfig {
    /// Class labels that take part in the comparison
    pub classes: BTreeSet<String>,
    /// Minimum confidence for reference boxes
    pub confidence_gt: f64,
    /// Minimum confidence for evaluated boxes
    pub confidence_det: f64,
    pub iou_threshold: f64,
    /// Frames kept in the detected-frames variant of relative F1
    pub detected_frames: DetectedFrameRule,
    /// Frames kept for relative mAP
    pub map_detected_frames: DetectedFrameRule,
    /// AP method for relative mAP
    pub method: ApMethod,
    /// Policy for relative mAP classes without reference boxes
    pub missing_positives: MissingPositives,
    /// Decimals kept in relative F1 metrics; `None` keeps full precision
    pub decimals: Option<u32>,
}

impl Default for RelativeConfig {
    fn default() -> Self {
        Self {
            classes: BTreeSet::new(),
            confidence_gt: DEFAULT_RELATIVE_CONFIDENCE,
            confidence_det: DEFAULT_RELATIVE_CONFIDENCE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            detected_frames: DetectedFrameRule::default(),
            map_detected_frames: DetectedFrameRule::AnyDetection,
            method: ApMethod::default(),
            missing_positives: MissingPositives::default(),
            decimals: Some(DEFAULT_RELATIVE_DECIMALS),
        }
    }
}

impl RelativeConfig {
    /// Create a configuration for the given class whitelist with default thresholds.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence_gt: f64, confidence_det: f64) -> Self {
        self.confidence_gt = confidence_gt;
        self.confidence_det = confidence_det;
        self
    }

    #[must_use]
    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    #[must_use]
    pub fn with_detected_frames(mut self, rule: DetectedFrameRule) -> Self {
        self.detected_frames = rule;
        self
    }

    #[must_use]
    pub fn with_map_detected_frames(mut self, rule: DetectedFrameRule) -> Self {
        self.map_detected_frames = rule;
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn is_whitelisted(&self, class_id: &str) -> bool {
        self.classes.contains(class_id)
    }

    /// Settings used for the AP pipeline in relative mAP.
    pub fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            iou_threshold: self.iou_threshold,
            method: self.method,
            missing_positives: self.missing_positives,
        }
    }
}

impl Validate for RelativeConfig {
    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(VocEvalError::InvalidConfig(
                "Relative metrics need at least one whitelisted class".to_string(),
            ));
        }
        validate_threshold(self.confidence_gt)?;
        validate_threshold(self.confidence_det)?;
        validate_threshold(self.iou_threshold)
    }
}

/// Load a configuration from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the
/// configuration fails validation.
///
/// # Example
///
/// ```no_run
/// use voc_eval::config::{load_from_file, EvaluationConfig};
///
/// let config: EvaluationConfig = load_from_file("evaluation.json").unwrap();
/// println!("IoU threshold: {}", config.iou_threshold);
/// ```
pub fn load_from_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned + Validate,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: T = serde_json::from_reader(reader)?;

    config.validate()?;

    Ok(config)
}

/// Load a configuration from a JSON string.
///
/// # Example
///
/// ```
/// use voc_eval::config::{load_from_string, RelativeConfig};
///
/// let json = r#"{ "classes": ["3", "4", "6", "8"], "confidence_det": 0.5 }"#;
/// let config: RelativeConfig = load_from_string(json).unwrap();
/// assert_eq!(config.classes.len(), 4);
/// assert_eq!(config.confidence_gt, 0.2);
/// ```
pub fn load_from_string<T>(json_str: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let config: T = serde_json::from_str(json_str)?;
    config.validate()?;
    Ok(config)
}
