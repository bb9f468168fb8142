//! Alignment of fixed-rate audio activity samples to the video frame clock.
//!
//! ```text
//! audio_index = floor((frame_index / fps) * (1 / audio_frame_duration))
//! ```
//!
//! No interpolation: each video frame takes the audio sample its start time
//! falls into, or the silent sample when that index is out of range.

use reframe_models::{AudioActivity, AudioTrack};

/// Index of the audio sample covering a video frame.
///
/// Returns `None` when the inputs cannot produce a sample index (non-positive
/// or non-finite fps or sample duration).
pub fn audio_index(frame_index: u64, fps: f64, audio_frame_duration: f64) -> Option<i64> {
    if !(fps.is_finite() && fps > 0.0) || !(audio_frame_duration.is_finite() && audio_frame_duration > 0.0) {
        return None;
    }
    let index = ((frame_index as f64 / fps) * (1.0 / audio_frame_duration)).floor();
    if index.is_finite() {
        Some(index as i64)
    } else {
        None
    }
}

/// Maps video frames to audio activity samples.
#[derive(Debug, Clone)]
pub struct AudioAligner {
    fps: f64,
    track: AudioTrack,
}

impl AudioAligner {
    /// Create an aligner for a video at `fps` over the given audio track.
    pub fn new(fps: f64, track: AudioTrack) -> Self {
        Self { fps, track }
    }

    /// Audio activity for a video frame; silent when out of range or absent.
    pub fn activity_for_frame(&self, frame_index: u64) -> AudioActivity {
        audio_index(frame_index, self.fps, self.track.frame_duration)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| self.track.samples.get(idx).copied())
            .unwrap_or_else(AudioActivity::silent)
    }
}
