//! Shared data models for the reframe analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Detector input (detections per frame)
//! - Voice activity samples
//! - Frame geometry and bounding boxes
//! - Per-frame analysis output consumed by auto-framing

pub mod audio;
pub mod class_names;
pub mod detection;
pub mod frame;
pub mod geometry;
pub mod video;

// Re-export common types
pub use audio::{AudioActivity, AudioTrack, DEFAULT_AUDIO_FRAME_DURATION};
pub use class_names::coco_class_name;
pub use detection::{Detection, FrameDetections};
pub use frame::{frame_record_schema, FrameObject, FrameRecord, TrackId};
pub use geometry::{BoundingBox, FrameGeometry, GeometryError};
pub use video::VideoId;
