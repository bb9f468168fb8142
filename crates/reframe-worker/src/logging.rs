//! Run-scoped logging for frame analysis.
//!
//! The video id lives on the run span; events carry frame counts and
//! analysis totals as structured fields.

use std::path::Path;

use reframe_models::{FrameGeometry, VideoId};
use tracing::{error, info, warn, Span};

use crate::error::WorkerError;
use crate::output::RunSummary;

/// Logs the lifecycle of one video's analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    video_id: String,
    progress_interval: u64,
}

impl AnalysisLogger {
    /// # Arguments
    /// * `video_id` - The video being analyzed
    /// * `progress_interval` - Log progress every this many frames (0 disables)
    pub fn new(video_id: &VideoId, progress_interval: u64) -> Self {
        Self {
            video_id: video_id.to_string(),
            progress_interval,
        }
    }

    /// Span that scopes every event of the run.
    pub fn span(&self) -> Span {
        tracing::info_span!("frame_analysis", video_id = %self.video_id)
    }

    pub fn started(&self, frames: usize, geometry: &FrameGeometry) {
        info!(
            frames,
            fps = geometry.fps,
            width = geometry.width,
            height = geometry.height,
            "Frame analysis started"
        );
    }

    /// An optional input is absent or unreadable and the run continues without it.
    pub fn input_degraded(&self, input: &'static str, effect: &'static str) {
        warn!(input, effect, "Analysis input degraded");
    }

    /// Whether finishing `frame_index` lands on a progress boundary.
    pub fn is_progress_frame(&self, frame_index: u64) -> bool {
        self.progress_interval > 0 && (frame_index + 1) % self.progress_interval == 0
    }

    /// Record that a frame was written, logging on progress boundaries.
    pub fn frame_done(&self, frame_index: u64, total: usize) {
        if self.is_progress_frame(frame_index) {
            info!(frame = frame_index + 1, total, "Frame analysis progress");
        }
    }

    pub fn failed(&self, err: &WorkerError) {
        error!(
            error = %err,
            config_error = err.is_config_error(),
            "Frame analysis failed"
        );
    }

    pub fn finished(&self, summary: &RunSummary, output_dir: &Path) {
        info!(
            run_id = %summary.run_id,
            frames = summary.frame_count,
            tracks_created = summary.tracks_created,
            tracks_evicted = summary.tracks_evicted,
            scene_changes = summary.scene_changes,
            speech_frames = summary.speech_frames,
            dropped_detections = summary.dropped_detections,
            unreadable_frames = summary.unreadable_frames,
            output_dir = %output_dir.display(),
            "Frame analysis finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_boundaries() {
        let logger = AnalysisLogger::new(&VideoId::from("clip-42"), 50);

        assert!(!logger.is_progress_frame(0));
        assert!(!logger.is_progress_frame(48));
        assert!(logger.is_progress_frame(49));
        assert!(logger.is_progress_frame(99));
        assert!(!logger.is_progress_frame(100));
    }

    #[test]
    fn test_zero_interval_never_reports() {
        let logger = AnalysisLogger::new(&VideoId::from("clip-42"), 0);
        assert!((0..200).all(|i| !logger.is_progress_frame(i)));
    }
}
