//! Writing per-frame records and run artifacts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reframe_media::AnalysisStats;
use reframe_models::{frame_record_schema, FrameGeometry, FrameRecord, VideoId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::frame_file_name;
use crate::error::WorkerResult;

/// Summary of one analysis run, written next to the frame records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub video_id: VideoId,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub fps: f64,
    pub resolution: [u32; 2],
    pub frame_count: u64,
    pub tracks_created: u64,
    pub tracks_evicted: u64,
    pub scene_changes: u64,
    pub speech_frames: u64,
    pub dropped_detections: u64,
    /// Frames whose detector entry could not be parsed
    pub unreadable_frames: u64,
}

impl RunSummary {
    pub fn new(video_id: VideoId, geometry: &FrameGeometry, stats: AnalysisStats, unreadable_frames: u64) -> Self {
        Self {
            video_id,
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            fps: geometry.fps,
            resolution: [geometry.width, geometry.height],
            frame_count: stats.frames,
            tracks_created: stats.tracks_created,
            tracks_evicted: stats.tracks_evicted,
            scene_changes: stats.scene_changes,
            speech_frames: stats.speech_frames,
            dropped_detections: stats.dropped_detections,
            unreadable_frames,
        }
    }
}

/// Writes frame records into a video's output directory.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    dir: PathBuf,
    pretty: bool,
}

impl FrameWriter {
    /// Create the output directory if needed.
    pub async fn create(dir: impl Into<PathBuf>, pretty: bool) -> WorkerResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, pretty })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn encode<T: Serialize>(&self, value: &T) -> WorkerResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }

    /// Write `frame_NNNNN.json` for one record.
    pub async fn write_frame(&self, record: &FrameRecord) -> WorkerResult<PathBuf> {
        let path = self.dir.join(frame_file_name(record.frame, "json"));
        tokio::fs::write(&path, self.encode(record)?).await?;
        Ok(path)
    }

    /// Write `summary.json`.
    pub async fn write_summary(&self, summary: &RunSummary) -> WorkerResult<PathBuf> {
        let path = self.dir.join("summary.json");
        tokio::fs::write(&path, self.encode(summary)?).await?;
        Ok(path)
    }

    /// Write `frame_record.schema.json` describing the per-frame documents.
    pub async fn write_schema(&self) -> WorkerResult<PathBuf> {
        let path = self.dir.join("frame_record.schema.json");
        let schema = serde_json::to_vec_pretty(&frame_record_schema())?;
        tokio::fs::write(&path, schema).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::AudioActivity;

    fn record(frame: u64) -> FrameRecord {
        FrameRecord {
            frame,
            timestamp: 0.0,
            fps: 30.0,
            resolution: [640, 360],
            objects: Vec::new(),
            audio: AudioActivity::silent(),
            is_scene_change: false,
            dominant_subject_id: None,
            dominant_subject_importance: 0.0,
            frame_focus_center: [320.0, 180.0],
            frame_focus_strength: 0.0,
            frame_event_score: 0.0,
            model_inference_ms: None,
        }
    }

    #[tokio::test]
    async fn test_write_frame_compact() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FrameWriter::create(dir.path().join("out"), false).await.unwrap();

        let path = writer.write_frame(&record(3)).await.unwrap();
        assert!(path.ends_with("frame_00003.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains('\n'));
        let parsed: FrameRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record(3));
    }

    #[tokio::test]
    async fn test_summary_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FrameWriter::create(dir.path(), true).await.unwrap();
        let geometry = FrameGeometry::new(25.0, 640, 360).unwrap();
        let stats = AnalysisStats {
            frames: 10,
            tracks_created: 2,
            ..Default::default()
        };

        let summary = RunSummary::new(VideoId::from("v1"), &geometry, stats, 1);
        let path = writer.write_summary(&summary).await.unwrap();
        let parsed: RunSummary = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, summary);

        let schema_path = writer.write_schema().await.unwrap();
        let schema: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(schema_path).unwrap()).unwrap();
        assert!(schema["properties"]["dominant_subject_confidence"].is_object());
    }
}
