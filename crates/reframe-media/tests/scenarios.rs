//! End-to-end behavior of the frame analyzer over short synthetic clips.

use reframe_media::{analyze_frames, AnalysisConfig, FrameAnalyzer, FrameInput, LumaFrame};
use reframe_models::{AudioActivity, AudioTrack, Detection, FrameGeometry, FrameRecord};

fn box_at(cx: f64, cy: f64) -> Detection {
    Detection::new(0, 0.9, [cx - 10.0, cy - 10.0, cx + 10.0, cy + 10.0])
}

fn analyzer(fps: f64, audio: AudioTrack) -> FrameAnalyzer {
    let geometry = FrameGeometry::new(fps, 1000, 800).unwrap();
    FrameAnalyzer::new(geometry, &AnalysisConfig::default(), audio).unwrap()
}

/// Small deterministic generator so the bounds test covers varied input.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[test]
fn test_small_motion_keeps_identity() {
    // Threshold is 1000 * 0.12 = 120 px.
    let mut analyzer = analyzer(30.0, AudioTrack::empty());

    let first = analyzer.process_frame(FrameInput::new(0, vec![box_at(100.0, 100.0)])).unwrap();
    let second = analyzer.process_frame(FrameInput::new(1, vec![box_at(102.0, 101.0)])).unwrap();

    assert_eq!(first.objects[0].id, second.objects[0].id);
    assert_eq!(first.objects[0].motion_vector, [0.0, 0.0]);
    assert_eq!(second.objects[0].motion_vector, [2.0, 1.0]);
    assert!(first.objects[0].is_new);
    assert!(!second.objects[0].is_new);
    assert_eq!(second.objects[0].stay_duration_frames, 2);
}

#[test]
fn test_split_detection_shares_existing_track() {
    let mut analyzer = analyzer(30.0, AudioTrack::empty());

    analyzer.process_frame(FrameInput::new(0, vec![box_at(100.0, 100.0)])).unwrap();
    let record = analyzer
        .process_frame(FrameInput::new(1, vec![box_at(110.0, 100.0), box_at(90.0, 100.0)]))
        .unwrap();

    assert_eq!(record.objects.len(), 2);
    for object in &record.objects {
        assert_eq!(object.id, 1);
        assert!(!object.is_new);
        assert_eq!(object.stay_duration_frames, 2);
    }
    assert_eq!(record.objects[0].motion_vector, [10.0, 0.0]);
    assert_eq!(record.objects[1].motion_vector, [-10.0, 0.0]);
    assert_eq!(analyzer.stats().tracks_created, 1);
}

#[test]
fn test_steady_mover_tracked_across_many_frames() {
    let mut analyzer = analyzer(30.0, AudioTrack::empty());

    for i in 0..50u64 {
        let x = 50.0 + (i as f64) * 15.0;
        let y = 400.0 + (i as f64 % 3.0) * 20.0;
        let record = analyzer.process_frame(FrameInput::new(i, vec![box_at(x, y)])).unwrap();
        assert_eq!(record.objects[0].id, 1, "frame {}", i);
        assert_eq!(record.objects[0].stay_duration_frames as u64, i + 1);
    }
}

#[test]
fn test_track_evicted_after_two_seconds_missing() {
    let mut analyzer = analyzer(30.0, AudioTrack::empty());

    for i in 0..10 {
        analyzer.process_frame(FrameInput::new(i, vec![box_at(500.0, 400.0)])).unwrap();
    }
    for i in 10..=70 {
        let record = analyzer.process_frame(FrameInput::new(i, vec![])).unwrap();
        assert!(record.objects.is_empty());
        if i < 70 {
            assert!(analyzer.registry().contains(1), "still live at frame {}", i);
        }
    }
    assert!(!analyzer.registry().contains(1));

    let record = analyzer.process_frame(FrameInput::new(71, vec![box_at(500.0, 400.0)])).unwrap();
    assert_eq!(record.objects[0].id, 2);
    assert!(record.objects[0].is_new);
    assert_eq!(analyzer.stats().tracks_evicted, 1);
}

#[test]
fn test_empty_frame_focuses_on_center() {
    let mut analyzer = analyzer(30.0, AudioTrack::empty());
    let record = analyzer.process_frame(FrameInput::new(0, vec![])).unwrap();

    assert_eq!(record.dominant_subject_id, None);
    assert_eq!(record.frame_focus_center, [500.0, 400.0]);
    assert_eq!(record.frame_event_score, 0.0);
}

#[test]
fn test_audio_past_end_reports_no_speech() {
    let samples = vec![
        AudioActivity {
            audio_energy: 0.3,
            speech_intensity: 0.9,
            is_speech: true,
            speech_prob: 1.0,
        };
        40
    ];
    let mut analyzer = analyzer(25.0, AudioTrack::new(0.04, samples));

    for i in 0..=50u64 {
        let record = analyzer.process_frame(FrameInput::new(i, vec![])).unwrap();
        if i < 40 {
            assert!(record.audio.is_speech, "frame {}", i);
        } else {
            assert!(!record.audio.is_speech, "frame {}", i);
            assert_eq!(record.audio.speech_prob, 0.0);
        }
    }
}

#[test]
fn test_track_ids_strictly_increase() {
    let mut analyzer = analyzer(10.0, AudioTrack::empty());
    let mut issued: Vec<u64> = Vec::new();

    // Objects jump far every frame, so each detection opens a new track.
    for i in 0..30u64 {
        let x = if i % 2 == 0 { 100.0 } else { 900.0 };
        let y = 100.0 + (i % 5) as f64 * 150.0;
        let record = analyzer
            .process_frame(FrameInput::new(i, vec![box_at(x, y), box_at(x, 780.0 - y)]))
            .unwrap();
        for object in record.objects.iter().filter(|o| o.is_new) {
            issued.push(object.id);
        }
    }

    assert!(!issued.is_empty());
    assert!(issued.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_every_object_references_a_live_track() {
    let mut analyzer = analyzer(5.0, AudioTrack::empty());

    for i in 0..40u64 {
        let detections = if i % 7 < 3 { vec![] } else { vec![box_at(100.0 + i as f64 * 20.0, 300.0)] };
        let record = analyzer.process_frame(FrameInput::new(i, detections)).unwrap();
        for object in &record.objects {
            assert!(analyzer.registry().contains(object.id));
        }
    }
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let mut rng = Lcg(7);
    let mut analyzer = analyzer(60.0, AudioTrack::empty());

    for i in 0..200u64 {
        let count = (rng.next_f64() * 6.0) as usize;
        let detections: Vec<Detection> = (0..count)
            .map(|_| {
                let x1 = rng.next_f64() * 1200.0 - 100.0;
                let y1 = rng.next_f64() * 1000.0 - 100.0;
                let w = rng.next_f64() * 1500.0;
                let h = rng.next_f64() * 1200.0;
                Detection::new(0, rng.next_f64(), [x1, y1, x1 + w, y1 + h])
            })
            .collect();
        let luma = LumaFrame::filled(4, 4, (rng.next_f64() * 255.0) as u8);
        let record = analyzer.process_frame(FrameInput::new(i, detections).with_luma(luma)).unwrap();

        assert!((0.0..=1.0).contains(&record.frame_event_score));
        assert!((0.0..=1.0).contains(&record.dominant_subject_importance));
        for object in &record.objects {
            assert!((0.0..=1.0).contains(&object.importance_score));
            assert!(object.bbox_normalized.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}

#[test]
fn test_identical_input_gives_identical_output() {
    let build = || -> Vec<FrameInput> {
        let mut rng = Lcg(42);
        (0..60u64)
            .map(|i| {
                let detections = (0..3)
                    .map(|_| box_at(rng.next_f64() * 1000.0, rng.next_f64() * 800.0))
                    .collect();
                FrameInput::new(i, detections).with_luma(LumaFrame::filled(4, 4, (i * 4) as u8))
            })
            .collect()
    };
    let geometry = FrameGeometry::new(24.0, 1000, 800).unwrap();
    let config = AnalysisConfig::default();

    let (first, _) = analyze_frames(geometry, &config, AudioTrack::empty(), build()).unwrap();
    let (second, _) = analyze_frames(geometry, &config, AudioTrack::empty(), build()).unwrap();

    let encode = |records: &[FrameRecord]| serde_json::to_string(records).unwrap();
    assert_eq!(encode(&first), encode(&second));
}

#[test]
fn test_scene_change_raises_event_score() {
    let mut analyzer = analyzer(30.0, AudioTrack::empty());

    let calm = analyzer
        .process_frame(FrameInput::new(0, vec![box_at(500.0, 400.0)]).with_luma(LumaFrame::filled(8, 8, 20)))
        .unwrap();
    let cut = analyzer
        .process_frame(FrameInput::new(1, vec![box_at(500.0, 400.0)]).with_luma(LumaFrame::filled(8, 8, 220)))
        .unwrap();

    assert!(!calm.is_scene_change);
    assert!(cut.is_scene_change);
    assert!((cut.frame_event_score - (calm.frame_event_score + 0.5)).abs() < 0.01);
}
