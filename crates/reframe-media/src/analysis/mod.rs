//! Object tracking and frame scoring for auto-framing.
//!
//! Turns identity-free per-frame detections and a fixed-rate voice activity
//! signal into one [`FrameRecord`](reframe_models::FrameRecord) per frame:
//! 1. Nearest-center tracking for identity persistence
//! 2. Per-object kinematics and importance scoring
//! 3. Luma-difference scene change detection
//! 4. Audio-to-video sample alignment
//! 5. Frame aggregation (dominant subject, focus point, event score)
//!
//! # Architecture
//!
//! ```text
//!  Detections      Luma plane       Audio samples
//!      │               │                 │
//!      ▼               ▼                 ▼
//! ┌──────────┐  ┌──────────────┐  ┌─────────────┐
//! │ Tracker  │  │ Scene Change │  │   Aligner   │
//! └────┬─────┘  └──────┬───────┘  └──────┬──────┘
//!      ▼               │                 │
//! ┌──────────┐         │                 │
//! │  Scorer  │         │                 │
//! └────┬─────┘         │                 │
//!      ▼               ▼                 ▼
//! ┌──────────────────────────────────────────────┐
//! │                 Aggregator                   │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//!                   FrameRecord
//! ```
//!
//! The tracker is the only component with cross-frame state, so frames must
//! be processed in increasing index order.

pub mod aggregator;
pub mod audio_align;
pub mod config;
pub mod pipeline;
pub mod scene_change;
pub mod scorer;
pub mod tracker;

pub use aggregator::{aggregate, dominant_index, frame_event_score, FrameContext};
pub use audio_align::{audio_index, AudioAligner};
pub use config::AnalysisConfig;
pub use pipeline::{analyze_frames, AnalysisStats, FrameAnalyzer, FrameInput};
pub use scene_change::{is_scene_change, mean_abs_diff, LumaFrame, SceneChangeDetector};
pub use scorer::{importance_score, score_object, Kinematics};
pub use tracker::{TrackAssignment, TrackRegistry};
