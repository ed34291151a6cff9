//! # voc-eval
//!
//! A Rust library for PASCAL VOC style object detection evaluation.
//!
//! This library provides:
//! - **AP** per class, with every-point or 11-point interpolation
//! - **mAP** (mean Average Precision) over the evaluated classes
//! - **Precision/recall curves** after each detection in confidence order
//! - **Relative F1 and mAP** of a detector measured against a reference detector
//!
//! Boxes use absolute pixel corners and the inclusive pixel-area convention:
//! a box from 0 to 9 is 10 pixels wide.
//!
//! ## Quick Start
//!
//! ```rust
//! use voc_eval::{evaluate, BoundingBox, BoundingBoxes, EvaluationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut boxes = BoundingBoxes::new();
//! boxes.add_ground_truth("img1", "person", BoundingBox::new(10.0, 10.0, 50.0, 80.0));
//! boxes.add_detection("img1", "person", 0.92, BoundingBox::new(12.0, 11.0, 49.0, 82.0));
//!
//! let report = evaluate(&boxes, &EvaluationConfig::default())?;
//! for (class_id, ap) in report.ap_per_class() {
//!     println!("{class_id}: AP {ap:.4}");
//! }
//! println!("mAP: {:.4}", report.map);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Both [`EvaluationConfig`] and [`RelativeConfig`] deserialize from JSON,
//! with a default for every missing field:
//!
//! ```json
//! {
//!   "classes": ["3", "4", "6", "8"],
//!   "confidence_gt": 0.2,
//!   "confidence_det": 0.2,
//!   "iou_threshold": 0.5,
//!   "detected_frames": "filtered_detections",
//!   "map_detected_frames": "any_detection",
//!   "method": "every_point"
//! }
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod matching;
pub mod metrics;
pub mod relative;
pub mod stats;
pub mod threshold;
pub mod types;

// Re-export commonly used types and functions
pub use config::{
    load_from_file, load_from_string, DetectedFrameRule, EvaluationConfig, MissingPositives,
    RelativeConfig, Validate,
};
pub use error::{Result, VocEvalError};
pub use evaluator::{evaluate, evaluate_at_iou};
pub use metrics::ap::ApMethod;
pub use relative::{relative_f1, relative_map, RelativeF1, RelativeF1Report, RelativeMapReport};
pub use stats::FrameStats;
pub use threshold::{filter_by_confidence, generate_threshold_range};
pub use types::{
    Annotation, BoundingBox, BoundingBoxes, BoxKind, ClassResult, EvaluationReport,
};
