//! Per-frame analysis driver.
//!
//! [`FrameAnalyzer`] owns all cross-frame state (the track registry and the
//! previous luma plane) and must see frames in increasing index order.
//! [`analyze_frames`] is the batch form: scene changes depend only on adjacent
//! frame pairs and are computed in parallel, while registry updates stay
//! sequential.

use metrics::counter;
use rayon::prelude::*;
use reframe_models::{AudioTrack, BoundingBox, Detection, FrameDetections, FrameGeometry, FrameRecord};
use tracing::{debug, warn};

use super::aggregator::{aggregate, FrameContext};
use super::audio_align::AudioAligner;
use super::config::AnalysisConfig;
use super::scene_change::{is_scene_change, LumaFrame, SceneChangeDetector};
use super::scorer::score_object;
use super::tracker::TrackRegistry;
use crate::error::{MediaError, MediaResult};

/// Everything the external sources supply for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Frame index, starting at 0
    pub frame_index: u64,
    /// Detector output; `None` when the detector failed for this frame
    pub detections: Option<FrameDetections>,
    /// Luma plane for scene change detection
    pub luma: Option<LumaFrame>,
}

impl FrameInput {
    /// Input with detections and no luma plane.
    pub fn new(frame_index: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame_index,
            detections: Some(FrameDetections::new(detections)),
            luma: None,
        }
    }

    /// Attach a luma plane.
    pub fn with_luma(mut self, luma: LumaFrame) -> Self {
        self.luma = Some(luma);
        self
    }
}

/// Running totals over an analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Frames processed
    pub frames: u64,
    /// Tracks opened
    pub tracks_created: u64,
    /// Tracks evicted
    pub tracks_evicted: u64,
    /// Frames flagged as scene changes
    pub scene_changes: u64,
    /// Frames with active speech
    pub speech_frames: u64,
    /// Detections dropped for non-finite coordinates
    pub dropped_detections: u64,
}

/// Sequential tracking and scoring engine for one video.
pub struct FrameAnalyzer {
    geometry: FrameGeometry,
    registry: TrackRegistry,
    scene_detector: SceneChangeDetector,
    aligner: AudioAligner,
    last_frame: Option<u64>,
    frames_processed: u64,
    speech_frames: u64,
    dropped_detections: u64,
}

impl FrameAnalyzer {
    /// Create an analyzer.
    ///
    /// Fails fast on geometry or configuration that would make every output
    /// undefined.
    pub fn new(geometry: FrameGeometry, config: &AnalysisConfig, audio: AudioTrack) -> MediaResult<Self> {
        geometry.validate()?;
        config.validate()?;

        let registry = TrackRegistry::new(
            config.match_distance_threshold(&geometry),
            config.max_missing_frames(geometry.fps),
        );
        debug!(
            match_threshold = registry.match_threshold(),
            max_missing = registry.max_missing(),
            audio_samples = audio.len(),
            "Frame analyzer initialized"
        );
        if audio.is_empty() {
            warn!("No audio activity available; every frame will report no speech");
        }

        Ok(Self {
            geometry,
            registry,
            scene_detector: SceneChangeDetector::new(config.scene_change_threshold),
            aligner: AudioAligner::new(geometry.fps, audio),
            last_frame: None,
            frames_processed: 0,
            speech_frames: 0,
            dropped_detections: 0,
        })
    }

    /// Process the next frame and emit its record.
    pub fn process_frame(&mut self, input: FrameInput) -> MediaResult<FrameRecord> {
        self.check_order(input.frame_index)?;
        let is_cut = self.scene_detector.check_frame(input.luma);
        Ok(self.track_and_aggregate(input.frame_index, input.detections, is_cut))
    }

    /// Process a frame whose scene change flag was computed elsewhere.
    fn process_with_scene_flag(
        &mut self,
        frame_index: u64,
        detections: Option<FrameDetections>,
        is_cut: bool,
    ) -> MediaResult<FrameRecord> {
        self.check_order(frame_index)?;
        self.scene_detector.record(is_cut);
        Ok(self.track_and_aggregate(frame_index, detections, is_cut))
    }

    fn check_order(&mut self, frame_index: u64) -> MediaResult<()> {
        if let Some(last) = self.last_frame {
            if frame_index <= last {
                return Err(MediaError::FrameOrder {
                    last,
                    got: frame_index,
                });
            }
        }
        self.last_frame = Some(frame_index);
        Ok(())
    }

    fn track_and_aggregate(
        &mut self,
        frame_index: u64,
        detections: Option<FrameDetections>,
        is_cut: bool,
    ) -> FrameRecord {
        let FrameDetections {
            detections,
            inference_ms,
        } = detections.unwrap_or_else(|| {
            debug!(frame_index, "No detector output; treating frame as empty");
            FrameDetections::empty()
        });

        let (detections, boxes) = self.sanitize(frame_index, detections);
        let assignments = self.registry.match_or_create(&boxes, frame_index);

        let objects: Vec<_> = detections
            .iter()
            .zip(boxes.iter())
            .zip(assignments.iter())
            .map(|((detection, bbox), assignment)| score_object(detection, bbox, assignment, &self.geometry))
            .collect();

        let audio = self.aligner.activity_for_frame(frame_index);
        if audio.is_speech {
            self.speech_frames += 1;
        }

        self.frames_processed += 1;
        counter!("reframe_frames_analyzed_total").increment(1);

        aggregate(
            FrameContext {
                frame_index,
                is_scene_change: is_cut,
                audio,
                inference_ms,
            },
            objects,
            &self.geometry,
        )
    }

    /// Drop detections with non-finite coordinates, collapse inverted boxes
    /// and clamp confidence into [0, 1].
    fn sanitize(&mut self, frame_index: u64, detections: Vec<Detection>) -> (Vec<Detection>, Vec<BoundingBox>) {
        let mut kept = Vec::with_capacity(detections.len());
        let mut boxes = Vec::with_capacity(detections.len());

        for mut detection in detections {
            let bbox = detection.bounding_box();
            if !bbox.is_finite() {
                self.dropped_detections += 1;
                warn!(frame_index, class_id = detection.class_id, "Dropping detection with non-finite box");
                continue;
            }
            detection.confidence = if detection.confidence.is_finite() {
                detection.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let bbox = bbox.sanitized();
            detection.bbox = bbox.xyxy();
            boxes.push(bbox);
            kept.push(detection);
        }

        (kept, boxes)
    }

    /// Geometry of the video.
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Track registry, for inspection.
    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    /// Totals so far.
    pub fn stats(&self) -> AnalysisStats {
        AnalysisStats {
            frames: self.frames_processed,
            tracks_created: self.registry.created_count(),
            tracks_evicted: self.registry.evicted_count(),
            scene_changes: self.scene_detector.cut_count(),
            speech_frames: self.speech_frames,
            dropped_detections: self.dropped_detections,
        }
    }
}

/// Analyze a whole clip in one call.
///
/// Scene changes are evaluated in parallel over adjacent frame pairs; tracking
/// and aggregation run in frame order. Output is identical to feeding the same
/// inputs through [`FrameAnalyzer::process_frame`].
pub fn analyze_frames(
    geometry: FrameGeometry,
    config: &AnalysisConfig,
    audio: AudioTrack,
    frames: Vec<FrameInput>,
) -> MediaResult<(Vec<FrameRecord>, AnalysisStats)> {
    let mut analyzer = FrameAnalyzer::new(geometry, config, audio)?;
    let threshold = config.scene_change_threshold;

    let cuts: Vec<bool> = (0..frames.len())
        .into_par_iter()
        .map(|i| {
            let Some(current) = frames[i].luma.as_ref() else {
                return false;
            };
            let previous = if i > 0 { frames[i - 1].luma.as_ref() } else { None };
            is_scene_change(previous, current, threshold)
        })
        .collect();

    let mut records = Vec::with_capacity(frames.len());
    for (frame, is_cut) in frames.into_iter().zip(cuts) {
        records.push(analyzer.process_with_scene_flag(frame.frame_index, frame.detections, is_cut)?);
    }

    Ok((records, analyzer.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::AudioActivity;

    fn geometry() -> FrameGeometry {
        FrameGeometry::new(30.0, 1920, 1080).unwrap()
    }

    fn person(cx: f64, cy: f64) -> Detection {
        Detection::new(0, 0.9, [cx - 20.0, cy - 40.0, cx + 20.0, cy + 40.0])
    }

    fn analyzer() -> FrameAnalyzer {
        FrameAnalyzer::new(geometry(), &AnalysisConfig::default(), AudioTrack::empty()).unwrap()
    }

    #[test]
    fn test_zero_geometry_fails_fast() {
        let geometry = FrameGeometry {
            fps: 30.0,
            width: 0,
            height: 1080,
        };
        let err = FrameAnalyzer::new(geometry, &AnalysisConfig::default(), AudioTrack::empty())
            .err()
            .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_frames_must_increase() {
        let mut analyzer = analyzer();
        analyzer.process_frame(FrameInput::new(0, vec![])).unwrap();
        analyzer.process_frame(FrameInput::new(1, vec![])).unwrap();

        let err = analyzer.process_frame(FrameInput::new(1, vec![])).unwrap_err();
        assert!(matches!(err, MediaError::FrameOrder { last: 1, got: 1 }));
    }

    #[test]
    fn test_missing_detector_output_is_empty_frame() {
        let mut analyzer = analyzer();
        let record = analyzer
            .process_frame(FrameInput {
                frame_index: 0,
                detections: None,
                luma: None,
            })
            .unwrap();

        assert!(record.objects.is_empty());
        assert_eq!(record.dominant_subject_id, None);
    }

    #[test]
    fn test_non_finite_detection_dropped() {
        let mut analyzer = analyzer();
        let bad = Detection::new(0, 0.9, [f64::NAN, 0.0, 10.0, 10.0]);
        let record = analyzer
            .process_frame(FrameInput::new(0, vec![bad, person(500.0, 500.0)]))
            .unwrap();

        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].id, 1);
        assert_eq!(analyzer.stats().dropped_detections, 1);
    }

    #[test]
    fn test_overflowing_boxes_keep_record_serializable() {
        let mut analyzer = analyzer();
        let wide = Detection::new(0, 0.9, [-1e308, 10.0, 1e308, 10.0]);
        let huge = Detection::new(0, 0.9, [0.0, 0.0, 1e200, 1e200]);
        let record = analyzer.process_frame(FrameInput::new(0, vec![wide, huge])).unwrap();

        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].bbox_area_pixels, 0.0);
        assert_eq!(record.objects[0].bbox_area_percentage, 0.0);
        assert_eq!(analyzer.stats().dropped_detections, 1);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: FrameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_confidence_clamped_and_inverted_box_collapsed() {
        let mut analyzer = analyzer();
        let odd = Detection::new(0, 1.7, [200.0, 200.0, 100.0, 300.0]);
        let record = analyzer.process_frame(FrameInput::new(0, vec![odd])).unwrap();

        let object = &record.objects[0];
        assert_eq!(object.confidence, 1.0);
        assert_eq!(object.bbox_area_pixels, 0.0);
        assert!(object.importance_score <= 1.0);
    }

    #[test]
    fn test_speech_frames_counted() {
        let audio = AudioTrack::new(
            0.04,
            vec![
                AudioActivity {
                    is_speech: true,
                    speech_prob: 0.8,
                    ..Default::default()
                };
                10
            ],
        );
        let mut analyzer = FrameAnalyzer::new(geometry(), &AnalysisConfig::default(), audio).unwrap();
        for i in 0..20 {
            analyzer.process_frame(FrameInput::new(i, vec![])).unwrap();
        }
        // 10 samples of 40 ms cover 0.4 s, i.e. frames 0..=11 at 30 fps.
        assert_eq!(analyzer.stats().speech_frames, 12);
        assert_eq!(analyzer.stats().frames, 20);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let frames: Vec<FrameInput> = (0..40u64)
            .map(|i| {
                let x = 100.0 + i as f64 * 7.0;
                let luma = LumaFrame::filled(16, 9, if i < 20 { 40 } else { 200 });
                let detections = if i % 13 == 5 {
                    vec![]
                } else {
                    vec![person(x, 300.0), person(1500.0, 600.0 - i as f64)]
                };
                FrameInput::new(i, detections).with_luma(luma)
            })
            .collect();

        let config = AnalysisConfig::default();
        let mut sequential = FrameAnalyzer::new(geometry(), &config, AudioTrack::empty()).unwrap();
        let expected: Vec<FrameRecord> = frames
            .iter()
            .cloned()
            .map(|f| sequential.process_frame(f).unwrap())
            .collect();

        let (records, stats) = analyze_frames(geometry(), &config, AudioTrack::empty(), frames).unwrap();

        assert_eq!(records, expected);
        assert_eq!(stats, sequential.stats());
        assert_eq!(stats.scene_changes, 1);
        assert!(records[20].is_scene_change);
    }
}
