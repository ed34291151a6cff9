//! Metrics calculation modules for detection evaluation.

pub mod iou;
pub mod ap;
pub mod precision_recall;
pub mod f1_score;

pub use iou::{area, boxes_intersect, calculate_iou, calculate_iou_matrix, intersection_area};
pub use ap::{
    calculate_ap, calculate_map, ApInterpolator, ApMethod, ElevenPointInterpolation,
    EveryPointInterpolation, InterpolatedAp,
};
pub use precision_recall::{build_curve, PrecisionRecall, PrecisionRecallCurve};
pub use f1_score::{calculate_f1_from_counts, calculate_f1_score, round_to};
