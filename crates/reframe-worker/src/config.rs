//! Worker configuration.

use std::path::{Path, PathBuf};

use reframe_media::AnalysisConfig;
use reframe_models::{VideoId, DEFAULT_AUDIO_FRAME_DURATION};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root of the storage tree holding inputs and outputs
    pub storage_dir: PathBuf,
    /// Duration of one audio activity sample in seconds
    pub audio_frame_duration: f64,
    /// Mean luma difference above which a frame counts as a cut
    pub scene_change_threshold: f64,
    /// Log progress every this many frames
    pub progress_interval: u64,
    /// Indent per-frame JSON output
    pub pretty_json: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("storage"),
            audio_frame_duration: DEFAULT_AUDIO_FRAME_DURATION,
            scene_change_threshold: AnalysisConfig::default().scene_change_threshold,
            progress_interval: 50,
            pretty_json: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_dir: std::env::var("REFRAME_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            audio_frame_duration: std::env::var("REFRAME_AUDIO_FRAME_DURATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|d: &f64| d.is_finite() && *d > 0.0)
                .unwrap_or(defaults.audio_frame_duration),
            scene_change_threshold: std::env::var("REFRAME_SCENE_CHANGE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| t.is_finite())
                .unwrap_or(defaults.scene_change_threshold),
            progress_interval: std::env::var("REFRAME_PROGRESS_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &u64| *n > 0)
                .unwrap_or(defaults.progress_interval),
            pretty_json: std::env::var("REFRAME_PRETTY_JSON")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(defaults.pretty_json),
        }
    }

    /// Use a different storage root.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Tracking and scoring settings for the analyzer.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::default().with_scene_change_threshold(self.scene_change_threshold)
    }

    /// Detector output manifest for a video.
    pub fn detections_path(&self, video_id: &VideoId) -> PathBuf {
        self.storage_dir
            .join("detections")
            .join(format!("{}.json", video_id))
    }

    /// Voice activity samples for a video.
    pub fn audio_path(&self, video_id: &VideoId) -> PathBuf {
        self.storage_dir.join("audio").join(format!("{}.json", video_id))
    }

    /// Directory of grayscale frames for a video.
    pub fn luma_dir(&self, video_id: &VideoId) -> PathBuf {
        self.storage_dir.join("frames_gray").join(video_id.as_str())
    }

    /// Output directory for per-frame records.
    pub fn output_dir(&self, video_id: &VideoId) -> PathBuf {
        self.storage_dir
            .join("video_frames_json")
            .join(video_id.as_str())
    }
}

/// File name of a per-frame artifact, e.g. `frame_00042.json`.
pub fn frame_file_name(frame_index: u64, extension: &str) -> String {
    format!("frame_{:05}.{}", frame_index, extension)
}

/// Path of the grayscale image for a frame, trying the supported extensions.
pub fn find_luma_frame(dir: &Path, frame_index: u64) -> Option<PathBuf> {
    ["png", "pgm", "jpg", "bmp"]
        .iter()
        .map(|ext| dir.join(frame_file_name(frame_index, ext)))
        .find(|path| path.is_file())
}
