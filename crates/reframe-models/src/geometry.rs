//! Frame geometry and pixel-space bounding boxes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frame rate assumed when the source does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Frame width assumed when the source does not report one.
pub const DEFAULT_WIDTH: u32 = 1920;

/// Frame height assumed when the source does not report one.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Errors raised for frame geometry that makes normalized output undefined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Frame width must be non-zero")]
    ZeroWidth,

    #[error("Frame height must be non-zero")]
    ZeroHeight,

    #[error("Invalid frame rate: {0}")]
    InvalidFps(f64),
}

/// Axis-aligned bounding box in pixel coordinates, stored as corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x1: f64,
    /// Top edge y-coordinate
    pub y1: f64,
    /// Right edge x-coordinate
    pub x2: f64,
    /// Bottom edge y-coordinate
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from an `[x1, y1, x2, y2]` array as emitted by detectors.
    pub fn from_xyxy(xyxy: [f64; 4]) -> Self {
        Self::new(xyxy[0], xyxy[1], xyxy[2], xyxy[3])
    }

    /// Corners as `[x1, y1, x2, y2]`.
    pub fn xyxy(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        (self.x1 + self.x2) / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        (self.y1 + self.y2) / 2.0
    }

    /// Center as `(cx, cy)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.cx(), self.cy())
    }

    /// Box width, never negative.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Box height, never negative.
    #[inline]
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Box area in pixels, 0 when the product overflows.
    #[inline]
    pub fn area(&self) -> f64 {
        let area = self.width() * self.height();
        if area.is_finite() {
            area
        } else {
            0.0
        }
    }

    /// Whether the corners, center and extent are all finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite()
            && self.y1.is_finite()
            && self.x2.is_finite()
            && self.y2.is_finite()
            && self.cx().is_finite()
            && self.cy().is_finite()
            && (self.x2 - self.x1).is_finite()
            && (self.y2 - self.y1).is_finite()
    }

    /// Collapse inverted edges so the box has zero extent on that axis.
    ///
    /// `x2 < x1` becomes `x2 == x1` (and likewise for y).
    pub fn sanitized(&self) -> BoundingBox {
        BoundingBox {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2.max(self.x1),
            y2: self.y2.max(self.y1),
        }
    }

    /// Euclidean distance between this box's center and a point.
    pub fn center_distance(&self, point: (f64, f64)) -> f64 {
        (self.cx() - point.0).hypot(self.cy() - point.1)
    }
}

/// Fixed geometry of the video being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameGeometry {
    /// Video frame rate
    pub fps: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl FrameGeometry {
    /// Create and validate a geometry.
    pub fn new(fps: f64, width: u32, height: u32) -> Result<Self, GeometryError> {
        let geometry = Self { fps, width, height };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Resolve geometry reported by a video source.
    ///
    /// Unreported values fall back to 30 fps and 1920x1080. A reported fps of
    /// zero means the container did not know it and also falls back. A
    /// reported zero width or height is rejected.
    pub fn resolve(
        fps: Option<f64>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, GeometryError> {
        let fps = match fps {
            Some(f) if f == 0.0 => DEFAULT_FPS,
            Some(f) => f,
            None => DEFAULT_FPS,
        };
        Self::new(
            fps,
            width.unwrap_or(DEFAULT_WIDTH),
            height.unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Check that every normalized output is well defined.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width == 0 {
            return Err(GeometryError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(GeometryError::ZeroHeight);
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(GeometryError::InvalidFps(self.fps));
        }
        Ok(())
    }

    /// Frame area in pixels.
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Length of the frame diagonal in pixels.
    pub fn diagonal(&self) -> f64 {
        (self.width as f64).hypot(self.height as f64)
    }

    /// Geometric center of the frame.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Larger of width and height.
    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.height) as f64
    }

    /// Timestamp of a frame in seconds.
    pub fn timestamp(&self, frame_index: u64) -> f64 {
        frame_index as f64 / self.fps
    }
}
