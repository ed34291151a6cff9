//! Error types for the voc-eval library.

use thiserror::Error;

/// Result type for voc-eval operations.
pub type Result<T> = std::result::Result<T, VocEvalError>;

/// Error types that can occur during detection evaluation.
#[derive(Error, Debug)]
pub enum VocEvalError {
    /// Error during JSON parsing of a configuration.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A class has detections but no ground-truth boxes, so recall is undefined.
    #[error("No positives: class '{0}' has no ground-truth boxes")]
    NoPositives(String),

    /// A count-based metric has a zero denominator.
    #[error("Undefined metric: {0} has a zero denominator")]
    UndefinedMetric(String),

    /// Invalid IoU or confidence threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Configuration that cannot drive an evaluation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Empty box collection provided.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
}
