//! Frame bookkeeping for relative metrics
//!
//! Tracks how many frames were seen, how many the evaluated detector covered,
//! and how many ended up with no boxes on either side after filtering.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Frame counters collected while partitioning boxes for relative metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Number of distinct frames (images) in the collection
    #[serde(rename = "Total Frames")]
    pub total_frames: usize,

    /// Number of frames the evaluated detector is considered to have processed
    #[serde(rename = "Detected Frames")]
    pub detected_frames: usize,

    /// Frames with no reference boxes left after filtering
    #[serde(rename = "Empty Reference Frames")]
    pub empty_reference_frames: usize,

    /// Frames with no evaluated boxes left after filtering
    #[serde(rename = "Empty Detection Frames")]
    pub empty_detection_frames: usize,
}

impl FrameStats {
    /// Create a new `FrameStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame and whether each side kept any boxes
    pub fn add_frame(&mut self, has_reference: bool, has_detections: bool) {
        self.total_frames += 1;
        if !has_reference {
            self.empty_reference_frames += 1;
        }
        if !has_detections {
            self.empty_detection_frames += 1;
        }
    }

    /// Record a frame as detected
    pub fn mark_detected(&mut self) {
        self.detected_frames += 1;
    }

    /// Frames left out of the detected-frames subset
    pub fn missed_frames(&self) -> usize {
        self.total_frames.saturating_sub(self.detected_frames)
    }

    /// Emit the counters as a structured log event
    pub fn log_summary(&self) {
        info!(
            total_frames = self.total_frames,
            detected_frames = self.detected_frames,
            missed_frames = self.missed_frames(),
            empty_reference_frames = self.empty_reference_frames,
            empty_detection_frames = self.empty_detection_frames,
            "frame statistics"
        );
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "FrameStats {{ total: {}, detected: {}, missed: {}, empty_reference: {}, empty_detection: {} }}",
            self.total_frames,
            self.detected_frames,
            self.missed_frames(),
            self.empty_reference_frames,
            self.empty_detection_frames
        )
    }
}
