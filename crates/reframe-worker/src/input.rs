//! Loading of stored detector, audio and grayscale frame data.
//!
//! Detector output is required. Audio and luma frames degrade gracefully:
//! a missing or unreadable audio file yields an empty track, and a missing
//! luma frame disables scene change detection for that frame.

use std::path::Path;

use reframe_media::LumaFrame;
use reframe_models::{AudioActivity, AudioTrack, Detection, FrameDetections, FrameGeometry};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{WorkerError, WorkerResult};

/// Detector output for a whole video.
#[derive(Debug, Clone, Default)]
pub struct DetectionManifest {
    /// Frame rate reported by the decoder
    pub fps: Option<f64>,
    /// Frame width in pixels
    pub width: Option<u32>,
    /// Frame height in pixels
    pub height: Option<u32>,
    /// Detections indexed by frame; `None` where the entry could not be parsed
    pub frames: Vec<Option<FrameDetections>>,
}

impl DetectionManifest {
    /// Frame geometry with defaults applied for unreported values.
    pub fn geometry(&self) -> WorkerResult<FrameGeometry> {
        Ok(FrameGeometry::resolve(self.fps, self.width, self.height)?)
    }

    /// Number of frames in the video.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of frame entries that failed to parse.
    pub fn unreadable_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_none()).count()
    }
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    fps: Option<f64>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    frames: Vec<Value>,
}

/// Parse one frame entry: either `{detections, inference_ms?}` or a bare array.
pub fn parse_frame_entry(value: Value) -> Option<FrameDetections> {
    let parsed = match value {
        Value::Array(_) => serde_json::from_value::<Vec<Detection>>(value).map(FrameDetections::new),
        Value::Object(_) => serde_json::from_value::<FrameDetections>(value),
        Value::Null => return None,
        other => {
            debug!(kind = ?other, "Unexpected frame entry");
            return None;
        }
    };
    parsed.map_err(|e| debug!("Frame entry failed to parse: {}", e)).ok()
}

/// Parse a detection manifest from JSON text.
pub fn parse_manifest(path: &Path, text: &str) -> WorkerResult<DetectionManifest> {
    let value: Value = serde_json::from_str(text)?;

    let raw = match value {
        // A bare list of frames carries no geometry.
        Value::Array(frames) => RawManifest {
            fps: None,
            width: None,
            height: None,
            frames,
        },
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| WorkerError::malformed(path, e.to_string()))?,
        _ => {
            return Err(WorkerError::malformed(
                path,
                "expected an object with `frames` or an array of frames",
            ))
        }
    };

    let frames: Vec<Option<FrameDetections>> = raw.frames.into_iter().map(parse_frame_entry).collect();
    let manifest = DetectionManifest {
        fps: raw.fps,
        width: raw.width,
        height: raw.height,
        frames,
    };

    let unreadable = manifest.unreadable_frames();
    if unreadable > 0 {
        warn!(
            path = %path.display(),
            unreadable,
            "Some frame entries could not be parsed; they will report zero detections"
        );
    }
    Ok(manifest)
}

/// Load the detection manifest for a video.
pub async fn load_manifest(path: &Path) -> WorkerResult<DetectionManifest> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WorkerError::InputNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    parse_manifest(path, &text)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAudio {
    Samples(Vec<AudioActivity>),
    Track(AudioTrack),
}

/// Parse audio activity JSON; a bare array uses `default_duration` per sample.
pub fn parse_audio(text: &str, default_duration: f64) -> Result<AudioTrack, serde_json::Error> {
    let track = match serde_json::from_str::<RawAudio>(text)? {
        RawAudio::Samples(samples) => AudioTrack::new(default_duration, samples),
        RawAudio::Track(track) => track,
    };
    Ok(track)
}

/// Load audio activity for a video, falling back to an empty track.
pub async fn load_audio(path: &Path, default_duration: f64) -> AudioTrack {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "Audio activity unavailable: {}", e);
            return AudioTrack::new(default_duration, Vec::new());
        }
    };

    match parse_audio(&text, default_duration) {
        Ok(track) => {
            debug!(samples = track.len(), frame_duration = track.frame_duration, "Loaded audio activity");
            track
        }
        Err(e) => {
            warn!(path = %path.display(), "Audio activity unreadable: {}", e);
            AudioTrack::new(default_duration, Vec::new())
        }
    }
}

/// Decode a grayscale frame. Blocking; call from the blocking pool.
pub fn decode_luma(path: &Path) -> WorkerResult<LumaFrame> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    Ok(LumaFrame::new(width, height, gray.into_raw())?)
}

/// Decode a grayscale frame, treating any failure as a missing frame.
pub fn load_luma(path: Option<&Path>) -> Option<LumaFrame> {
    let path = path?;
    match decode_luma(path) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(path = %path.display(), "Skipping unreadable luma frame: {}", e);
            None
        }
    }
}
