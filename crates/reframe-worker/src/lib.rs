//! Frame analysis worker.
//!
//! This crate provides:
//! - Loading of stored detector, audio and grayscale frame data
//! - A per-video processor that drives the frame analyzer
//! - Per-frame JSON output plus a run summary and schema
//! - Run-scoped structured logging

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use input::DetectionManifest;
pub use logging::AnalysisLogger;
pub use output::{FrameWriter, RunSummary};
pub use processor::VideoProcessor;
