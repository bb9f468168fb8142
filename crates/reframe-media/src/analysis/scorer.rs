//! Per-object kinematics and importance scoring.
//!
//! Importance fuses three signals with fixed weights:
//!
//! ```text
//! importance = 0.45 * min(area% / 100, 1)
//!            + 0.35 * min(motion / 30, 1)
//!            + 0.20 * confidence
//! ```

use reframe_models::{BoundingBox, Detection, FrameGeometry, FrameObject};

use super::tracker::TrackAssignment;

/// Weight of the box area term.
pub const AREA_WEIGHT: f64 = 0.45;

/// Weight of the motion term.
pub const MOTION_WEIGHT: f64 = 0.35;

/// Weight of the detector confidence term.
pub const CONFIDENCE_WEIGHT: f64 = 0.20;

/// Motion in pixels per frame that saturates the motion term.
pub const MOTION_NORMALIZATION: f64 = 30.0;

/// Motion of one object between consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Horizontal displacement in pixels per frame
    pub vx: f64,
    /// Vertical displacement in pixels per frame
    pub vy: f64,
    /// Euclidean norm of the displacement
    pub magnitude: f64,
    /// Speed in pixels per second
    pub velocity_px_second: f64,
}

impl Kinematics {
    /// Displacement from `previous` to `current`; zero when there is no previous center.
    pub fn between(previous: Option<(f64, f64)>, current: (f64, f64), fps: f64) -> Self {
        let (vx, vy) = match previous {
            Some((px, py)) => (current.0 - px, current.1 - py),
            None => (0.0, 0.0),
        };
        let magnitude = vx.hypot(vy);
        Self {
            vx,
            vy,
            magnitude,
            velocity_px_second: magnitude * fps,
        }
    }
}

/// Composite importance of an object.
///
/// Bounded to [0, 1] for confidence in [0, 1] and non-negative area and motion.
pub fn importance_score(area_percentage: f64, motion_magnitude: f64, confidence: f64) -> f64 {
    let area_score = (area_percentage / 100.0).min(1.0);
    let motion_score = (motion_magnitude / MOTION_NORMALIZATION).min(1.0);
    AREA_WEIGHT * area_score + MOTION_WEIGHT * motion_score + CONFIDENCE_WEIGHT * confidence
}

/// Box area as a percentage of the frame, 0 for a zero-area frame.
pub fn area_percentage(bbox: &BoundingBox, geometry: &FrameGeometry) -> f64 {
    let frame_area = geometry.area();
    if frame_area > 0.0 {
        bbox.area() / frame_area * 100.0
    } else {
        0.0
    }
}

/// Build the output record for a detection whose identity has been resolved.
///
/// The box is expected to be sanitized (no inverted edges) and the confidence
/// clamped to [0, 1].
pub fn score_object(
    detection: &Detection,
    bbox: &BoundingBox,
    assignment: &TrackAssignment,
    geometry: &FrameGeometry,
) -> FrameObject {
    let (cx, cy) = bbox.center();
    let w = bbox.width();
    let h = bbox.height();
    let frame_w = geometry.width as f64;
    let frame_h = geometry.height as f64;

    let kinematics = Kinematics::between(assignment.previous_center, (cx, cy), geometry.fps);
    let area_pct = area_percentage(bbox, geometry);
    let confidence = detection.confidence;

    FrameObject {
        id: assignment.track_id,
        class_id: detection.class_id,
        class_name: detection.resolved_class_name(),
        confidence,
        bbox_xyxy: bbox.xyxy(),
        bbox_center: [cx, cy],
        bbox_xywh: [cx, cy, w, h],
        bbox_normalized: [
            normalize(cx, frame_w),
            normalize(cy, frame_h),
            normalize(w, frame_w),
            normalize(h, frame_h),
        ],
        bbox_area_pixels: bbox.area(),
        bbox_area_percentage: area_pct,
        motion_vector: [kinematics.vx, kinematics.vy],
        motion_magnitude: kinematics.magnitude,
        velocity_px_frame: kinematics.magnitude,
        velocity_px_second: kinematics.velocity_px_second,
        is_new: assignment.dwell <= 1,
        stay_duration_frames: assignment.dwell,
        importance_score: importance_score(area_pct, kinematics.magnitude, confidence),
    }
}

/// Divide by a frame dimension and clamp into [0, 1].
fn normalize(value: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        (value / extent).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
