#![deny(unreachable_patterns)]
//! Frame analysis engine for auto-framing.
//!
//! This crate provides:
//! - Cross-frame object identity (nearest-center tracking with eviction)
//! - Motion, velocity and importance scoring per object
//! - Hard-cut detection from luma differences
//! - Alignment of voice activity samples to video frames
//! - Per-frame records naming the dominant subject and an event score

pub mod analysis;
pub mod error;

pub use analysis::{
    analyze_frames, AnalysisConfig, AnalysisStats, AudioAligner, FrameAnalyzer, FrameInput,
    LumaFrame, SceneChangeDetector, TrackRegistry,
};
pub use error::{MediaError, MediaResult};
