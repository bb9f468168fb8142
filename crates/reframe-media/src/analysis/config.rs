//! Configuration for frame analysis.

use reframe_models::FrameGeometry;
use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Configuration for the tracking and scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // === Tracking ===
    /// Match radius as a fraction of the larger frame dimension (default: 0.12)
    pub match_distance_ratio: f64,

    /// Seconds a track may go unmatched before eviction (default: 2.0)
    pub eviction_seconds: f64,

    /// Lower bound on the eviction threshold in frames (default: 2)
    pub min_eviction_frames: u32,

    // === Scene Change ===
    /// Mean absolute luma difference above which a frame is a cut (default: 25.0)
    pub scene_change_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            match_distance_ratio: 0.12,
            eviction_seconds: 2.0,
            min_eviction_frames: 2,
            scene_change_threshold: 25.0,
        }
    }
}

impl AnalysisConfig {
    /// Builder-style setter for the scene change threshold.
    pub fn with_scene_change_threshold(mut self, threshold: f64) -> Self {
        self.scene_change_threshold = threshold;
        self
    }

    /// Maximum center distance in pixels for a detection to join a track.
    pub fn match_distance_threshold(&self, geometry: &FrameGeometry) -> f64 {
        geometry.max_dimension() * self.match_distance_ratio
    }

    /// Consecutive missed frames a track survives; one more evicts it.
    pub fn max_missing_frames(&self, fps: f64) -> u32 {
        let frames = (fps * self.eviction_seconds).round();
        let frames = if frames.is_finite() && frames > 0.0 {
            frames.min(u32::MAX as f64) as u32
        } else {
            0
        };
        frames.max(self.min_eviction_frames)
    }

    /// Reject values that would make tracking or alignment meaningless.
    pub fn validate(&self) -> MediaResult<()> {
        if !self.match_distance_ratio.is_finite() || self.match_distance_ratio < 0.0 {
            return Err(MediaError::invalid_config(format!(
                "match_distance_ratio must be non-negative, got {}",
                self.match_distance_ratio
            )));
        }
        if !self.eviction_seconds.is_finite() || self.eviction_seconds < 0.0 {
            return Err(MediaError::invalid_config(format!(
                "eviction_seconds must be non-negative, got {}",
                self.eviction_seconds
            )));
        }
        if !self.scene_change_threshold.is_finite() {
            return Err(MediaError::invalid_config("scene_change_threshold must be finite"));
        }
        Ok(())
    }
}
