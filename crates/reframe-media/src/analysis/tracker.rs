//! Nearest-center tracker for maintaining object identity across frames.
//!
//! Each detection claims the live track whose last known center is closest,
//! provided it lies within the match radius; otherwise a new track is opened.
//! Matching is greedy and single-pass: a detection never gives up a track to a
//! later, closer detection.

use metrics::counter;
use reframe_models::{BoundingBox, TrackId};
use std::collections::BTreeMap;
use tracing::debug;

/// Track information.
#[derive(Debug, Clone)]
struct Track {
    /// Last known center
    center: (f64, f64),
    /// Consecutive frames without a match
    missing: u32,
    /// Frames matched so far
    dwell: u32,
}

/// Identity resolved for one detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackAssignment {
    /// Track the detection belongs to
    pub track_id: TrackId,
    /// Track center before this frame; `None` for a track opened this frame
    pub previous_center: Option<(f64, f64)>,
    /// Track was opened this frame
    pub is_new: bool,
    /// Frames the track has been matched, including this one
    pub dwell: u32,
}

/// Registry of live tracks.
///
/// Tracks are kept in id order, so when two tracks are equally close to a
/// detection the lower id wins.
#[derive(Debug)]
pub struct TrackRegistry {
    /// Maximum center distance for a match, in pixels
    match_threshold: f64,
    /// Missed frames tolerated before eviction
    max_missing: u32,
    /// Live tracks by id
    tracks: BTreeMap<TrackId, Track>,
    /// Next track ID to assign
    next_track_id: TrackId,
    /// Tracks opened over the registry's lifetime
    created_count: u64,
    /// Tracks evicted over the registry's lifetime
    evicted_count: u64,
}

impl TrackRegistry {
    /// Create a new registry.
    ///
    /// # Arguments
    /// * `match_threshold` - Maximum center distance in pixels for a match
    /// * `max_missing` - A track missing for more than this many consecutive frames is evicted
    pub fn new(match_threshold: f64, max_missing: u32) -> Self {
        Self {
            match_threshold,
            max_missing,
            tracks: BTreeMap::new(),
            next_track_id: 1,
            created_count: 0,
            evicted_count: 0,
        }
    }

    /// Resolve identities for one frame's detections and advance track lifecycles.
    ///
    /// Candidates are the tracks that were live when the frame started; tracks
    /// opened by earlier detections of the same frame cannot be claimed. When
    /// several detections claim one track, they all receive its id, its dwell
    /// advances once and the first claimant's center becomes its position.
    ///
    /// # Returns
    /// One assignment per detection, in input order.
    pub fn match_or_create(&mut self, detections: &[BoundingBox], frame_index: u64) -> Vec<TrackAssignment> {
        let mut assignments = Vec::with_capacity(detections.len());
        // track id -> center of the first detection that claimed it
        let mut claimed: BTreeMap<TrackId, (f64, f64)> = BTreeMap::new();
        let mut opened: Vec<(TrackId, (f64, f64))> = Vec::new();

        for bbox in detections {
            let center = bbox.center();

            match self.nearest_track(bbox) {
                Some((track_id, track)) => {
                    // Every claimant sees the advanced dwell; the track itself
                    // advances once when the frame is committed.
                    claimed.entry(track_id).or_insert(center);
                    assignments.push(TrackAssignment {
                        track_id,
                        previous_center: Some(track.center),
                        is_new: false,
                        dwell: track.dwell.saturating_add(1),
                    });
                }
                None => {
                    let track_id = self.next_track_id;
                    self.next_track_id += 1;
                    opened.push((track_id, center));
                    assignments.push(TrackAssignment {
                        track_id,
                        previous_center: None,
                        is_new: true,
                        dwell: 1,
                    });
                }
            }
        }

        // Age unmatched tracks
        let max_missing = self.max_missing;
        let mut to_remove = Vec::new();
        for (&track_id, track) in self.tracks.iter_mut() {
            match claimed.get(&track_id) {
                Some(&center) => {
                    track.center = center;
                    track.missing = 0;
                    track.dwell = track.dwell.saturating_add(1);
                }
                None => {
                    track.missing += 1;
                    if track.missing > max_missing {
                        to_remove.push(track_id);
                    }
                }
            }
        }

        for track_id in to_remove {
            self.tracks.remove(&track_id);
            self.evicted_count += 1;
            counter!("reframe_tracks_evicted_total").increment(1);
            debug!(track_id, frame_index, "Track evicted");
        }

        for (track_id, center) in opened {
            self.tracks.insert(
                track_id,
                Track {
                    center,
                    missing: 0,
                    dwell: 1,
                },
            );
            self.created_count += 1;
            counter!("reframe_tracks_created_total").increment(1);
            debug!(track_id, frame_index, cx = center.0, cy = center.1, "Track created");
        }

        assignments
    }

    /// Closest live track within the match radius.
    fn nearest_track(&self, bbox: &BoundingBox) -> Option<(TrackId, &Track)> {
        let mut best: Option<(TrackId, &Track, f64)> = None;

        for (&track_id, track) in &self.tracks {
            let distance = bbox.center_distance(track.center);
            let closer = match best {
                Some((_, _, best_distance)) => distance < best_distance,
                None => true,
            };
            if closer {
                best = Some((track_id, track, distance));
            }
        }

        best.filter(|(_, _, distance)| *distance <= self.match_threshold)
            .map(|(track_id, track, _)| (track_id, track))
    }

    /// Whether a track is currently live.
    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Number of live tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no track is live.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks opened since the registry was created.
    pub fn created_count(&self) -> u64 {
        self.created_count
    }

    /// Tracks evicted since the registry was created.
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }

    /// Match radius in pixels.
    pub fn match_threshold(&self) -> f64 {
        self.match_threshold
    }

    /// Missed frames tolerated before eviction.
    pub fn max_missing(&self) -> u32 {
        self.max_missing
    }
}
