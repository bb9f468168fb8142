//! Video analysis orchestration.
//!
//! Loads stored detector and audio output for one video, runs the frame
//! analyzer over every frame in order, and writes one JSON record per frame.
//! Luma decoding and analysis run on the blocking pool; file I/O stays async.

use std::path::PathBuf;

use reframe_media::{FrameAnalyzer, FrameInput};
use reframe_models::{FrameDetections, FrameRecord, VideoId};
use tracing::Instrument;

use crate::config::{find_luma_frame, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::input::{load_audio, load_luma, load_manifest};
use crate::logging::AnalysisLogger;
use crate::output::{FrameWriter, RunSummary};

/// Runs frame analysis for videos stored under one storage root.
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    config: WorkerConfig,
}

impl VideoProcessor {
    /// Create a new video processor.
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Analyze every frame of a video and write the per-frame records.
    pub async fn process(&self, video_id: &VideoId) -> WorkerResult<RunSummary> {
        if !video_id.is_path_safe() {
            return Err(WorkerError::InvalidVideoId(video_id.to_string()));
        }

        let logger = AnalysisLogger::new(video_id, self.config.progress_interval);
        let span = logger.span();
        async {
            let result = self.run(video_id, &logger).await;
            if let Err(e) = &result {
                logger.failed(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, video_id: &VideoId, logger: &AnalysisLogger) -> WorkerResult<RunSummary> {
        let manifest = load_manifest(&self.config.detections_path(video_id)).await?;
        let geometry = manifest.geometry()?;
        let total = manifest.frame_count();
        logger.started(total, &geometry);

        let audio = load_audio(&self.config.audio_path(video_id), self.config.audio_frame_duration).await;
        if audio.is_empty() {
            logger.input_degraded("audio", "all frames report no speech");
        }

        let mut analyzer = FrameAnalyzer::new(geometry, &self.config.analysis_config(), audio)?;
        let writer = FrameWriter::create(self.config.output_dir(video_id), self.config.pretty_json).await?;
        writer.write_schema().await?;

        let luma_dir = self.config.luma_dir(video_id);
        let luma_dir = if tokio::fs::try_exists(&luma_dir).await.unwrap_or(false) {
            Some(luma_dir)
        } else {
            logger.input_degraded("grayscale frames", "scene change detection disabled");
            None
        };

        let unreadable_frames = manifest.unreadable_frames() as u64;
        for (idx, detections) in manifest.frames.into_iter().enumerate() {
            let frame_index = idx as u64;
            let (returned, record) = analyze_blocking(analyzer, frame_index, detections, luma_dir.clone()).await?;
            analyzer = returned;

            writer.write_frame(&record?).await?;
            logger.frame_done(frame_index, total);
        }

        let summary = RunSummary::new(video_id.clone(), &geometry, analyzer.stats(), unreadable_frames);
        writer.write_summary(&summary).await?;
        logger.finished(&summary, writer.dir());
        Ok(summary)
    }
}

/// Decode the frame's luma plane and analyze it on the blocking pool.
///
/// The analyzer moves into the task and is handed back with the result.
async fn analyze_blocking(
    mut analyzer: FrameAnalyzer,
    frame_index: u64,
    detections: Option<FrameDetections>,
    luma_dir: Option<PathBuf>,
) -> WorkerResult<(FrameAnalyzer, WorkerResult<FrameRecord>)> {
    tokio::task::spawn_blocking(move || {
        let luma = luma_dir.and_then(|dir| load_luma(find_luma_frame(&dir, frame_index).as_deref()));
        let record = analyzer
            .process_frame(FrameInput {
                frame_index,
                detections,
                luma,
            })
            .map_err(WorkerError::from);
        (analyzer, record)
    })
    .await
    .map_err(|e| WorkerError::processing_failed(format!("frame {} analysis task failed: {}", frame_index, e)))
}
