//! Per-frame analysis output consumed by the auto-framing stage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audio::AudioActivity;

/// Identity of a tracked object. Issued in increasing order, never reused.
pub type TrackId = u64;

/// One tracked object in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameObject {
    /// Track id
    pub id: TrackId,
    /// Detector class id
    pub class_id: i64,
    /// Class label
    pub class_name: String,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,

    /// `[x1, y1, x2, y2]` in pixels
    pub bbox_xyxy: [f64; 4],
    /// `[cx, cy]` in pixels
    pub bbox_center: [f64; 2],
    /// `[cx, cy, w, h]` in pixels
    pub bbox_xywh: [f64; 4],
    /// `[cx, cy, w, h]` divided by frame dimensions
    pub bbox_normalized: [f64; 4],
    /// Box area in pixels
    pub bbox_area_pixels: f64,
    /// Box area as a percentage of the frame area
    pub bbox_area_percentage: f64,

    /// Center displacement since the previous frame, pixels per frame
    pub motion_vector: [f64; 2],
    /// Length of the motion vector
    pub motion_magnitude: f64,
    /// Speed in pixels per frame
    pub velocity_px_frame: f64,
    /// Speed in pixels per second
    pub velocity_px_second: f64,

    /// First frame of this track
    pub is_new: bool,
    /// Frames this track has been matched
    pub stay_duration_frames: u32,
    /// Composite importance (0.0-1.0)
    pub importance_score: f64,
}

/// Everything known about one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameRecord {
    /// Frame index, starting at 0
    pub frame: u64,
    /// Seconds since the start of the clip, rounded to milliseconds
    pub timestamp: f64,
    /// Video frame rate
    pub fps: f64,
    /// `[width, height]` in pixels
    pub resolution: [u32; 2],
    /// Tracked objects in detection order
    pub objects: Vec<FrameObject>,
    /// Voice activity aligned to this frame
    pub audio: AudioActivity,
    /// Hard cut relative to the previous frame
    pub is_scene_change: bool,
    /// Track id of the most important object
    pub dominant_subject_id: Option<TrackId>,
    /// Importance of the dominant subject, 0.0 when there is none
    #[serde(rename = "dominant_subject_confidence")]
    pub dominant_subject_importance: f64,
    /// Where the framing should center
    pub frame_focus_center: [f64; 2],
    /// Same as the dominant importance; kept for downstream consumers
    pub frame_focus_strength: f64,
    /// How eventful the frame is (0.0-1.0)
    pub frame_event_score: f64,
    /// Detector inference time, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_inference_ms: Option<f64>,
}

/// JSON schema describing a serialized [`FrameRecord`].
pub fn frame_record_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(FrameRecord)
}
