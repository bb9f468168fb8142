//! Scene change detection by luminance differencing.
//!
//! A frame is a hard cut when the mean absolute difference between its 8-bit
//! luma plane and the previous frame's exceeds a fixed threshold. There is no
//! debounce or hysteresis: every frame is judged against its immediate
//! predecessor only.

use metrics::counter;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Default mean-absolute-difference threshold on the 0-255 luma scale.
pub const DEFAULT_SCENE_CHANGE_THRESHOLD: f64 = 25.0;

/// Grayscale (luma) plane of one frame, row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl LumaFrame {
    /// Wrap a luma buffer, checking it holds exactly `width * height` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> MediaResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(MediaError::invalid_frame(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame filled with one luma value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    /// Plane width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw luma bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn same_shape(&self, other: &LumaFrame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Mean absolute per-pixel difference between two planes of equal size.
///
/// Returns `None` when the planes differ in size, and 0 for empty planes.
pub fn mean_abs_diff(a: &LumaFrame, b: &LumaFrame) -> Option<f64> {
    if !a.same_shape(b) {
        return None;
    }
    if a.pixels.is_empty() {
        return Some(0.0);
    }

    let total: u64 = a
        .pixels
        .iter()
        .zip(b.pixels.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();

    Some(total as f64 / a.pixels.len() as f64)
}

/// Decide whether `current` is a cut relative to `previous`.
///
/// No previous frame means no cut. Planes of different size count as a cut.
pub fn is_scene_change(previous: Option<&LumaFrame>, current: &LumaFrame, threshold: f64) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    match mean_abs_diff(previous, current) {
        Some(diff) => diff > threshold,
        None => true,
    }
}

/// Stateful scene change detector for sequential frame processing.
pub struct SceneChangeDetector {
    threshold: f64,
    /// Previous frame's luma plane
    prev_frame: Option<LumaFrame>,
    /// Total cuts detected
    cut_count: u64,
}

impl SceneChangeDetector {
    /// Create a new detector with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            prev_frame: None,
            cut_count: 0,
        }
    }

    /// Check whether the current frame is a cut, then remember it.
    ///
    /// A missing luma plane yields `false` and also clears the stored
    /// predecessor, so the following frame is not compared either.
    pub fn check_frame(&mut self, frame: Option<LumaFrame>) -> bool {
        let Some(frame) = frame else {
            debug!("No luma plane for frame; skipping scene change check");
            self.prev_frame = None;
            return false;
        };

        let is_cut = is_scene_change(self.prev_frame.as_ref(), &frame, self.threshold);
        self.prev_frame = Some(frame);
        self.record(is_cut);
        is_cut
    }

    /// Count a decision made outside the detector (batch mode).
    pub fn record(&mut self, is_cut: bool) {
        if is_cut {
            self.cut_count += 1;
            counter!("reframe_scene_changes_total").increment(1);
            info!(threshold = self.threshold, "Scene change detected");
        }
    }

    /// Get total cuts detected.
    pub fn cut_count(&self) -> u64 {
        self.cut_count
    }
}

impl Default for SceneChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_CHANGE_THRESHOLD)
    }
}
