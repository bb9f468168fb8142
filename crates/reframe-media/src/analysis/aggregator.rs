//! Frame-level aggregation: dominant subject, focus point and event score.

use reframe_models::{AudioActivity, FrameGeometry, FrameObject, FrameRecord};

/// Bonus added to the event score on a scene change.
pub const SCENE_CHANGE_BONUS: f64 = 0.5;

/// Per-frame inputs to aggregation besides the scored objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    /// Frame index
    pub frame_index: u64,
    /// Hard cut relative to the previous frame
    pub is_scene_change: bool,
    /// Aligned audio activity
    pub audio: AudioActivity,
    /// Detector inference time
    pub inference_ms: Option<f64>,
}

/// Index of the most important object; the first one wins ties.
pub fn dominant_index(objects: &[FrameObject]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, object) in objects.iter().enumerate() {
        match best {
            Some((_, score)) if object.importance_score <= score => {}
            _ => best = Some((idx, object.importance_score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// How eventful a frame is, in [0, 1].
///
/// Average importance plus a motion term normalized by the frame diagonal,
/// plus a fixed bonus on a scene change. Zero for a frame without objects.
pub fn frame_event_score(objects: &[FrameObject], is_scene_change: bool, geometry: &FrameGeometry) -> f64 {
    if objects.is_empty() {
        return 0.0;
    }

    let count = objects.len() as f64;
    let avg_importance = objects.iter().map(|o| o.importance_score).sum::<f64>() / count;
    let total_motion: f64 = objects.iter().map(|o| o.motion_magnitude).sum();
    let motion_factor = total_motion / (count * (geometry.diagonal() + 1.0));
    let scene_bonus = if is_scene_change { SCENE_CHANGE_BONUS } else { 0.0 };

    (avg_importance + motion_factor + scene_bonus).min(1.0)
}

/// Round seconds to milliseconds.
fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Assemble the record for one frame. Holds no state between frames.
pub fn aggregate(context: FrameContext, objects: Vec<FrameObject>, geometry: &FrameGeometry) -> FrameRecord {
    let event_score = frame_event_score(&objects, context.is_scene_change, geometry);

    let (dominant_id, dominant_importance, focus) = match dominant_index(&objects) {
        Some(idx) => {
            let dominant = &objects[idx];
            (Some(dominant.id), dominant.importance_score, dominant.bbox_center)
        }
        None => {
            let (cx, cy) = geometry.center();
            (None, 0.0, [cx, cy])
        }
    };

    FrameRecord {
        frame: context.frame_index,
        timestamp: round_millis(geometry.timestamp(context.frame_index)),
        fps: geometry.fps,
        resolution: [geometry.width, geometry.height],
        objects,
        audio: context.audio,
        is_scene_change: context.is_scene_change,
        dominant_subject_id: dominant_id,
        dominant_subject_importance: dominant_importance,
        frame_focus_center: focus,
        frame_focus_strength: dominant_importance,
        frame_event_score: event_score,
        model_inference_ms: context.inference_ms,
    }
}
