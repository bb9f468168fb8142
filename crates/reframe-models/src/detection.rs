//! Per-frame detector output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::class_names::coco_class_name;
use crate::geometry::BoundingBox;

/// One object detection in one frame, before identity assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Detector class id
    pub class_id: i64,
    /// Human-readable class label, when the detector provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
    /// Bounding box as `[x1, y1, x2, y2]` in pixels
    pub bbox: [f64; 4],
}

impl Detection {
    /// Create a new detection.
    pub fn new(class_id: i64, confidence: f64, bbox: [f64; 4]) -> Self {
        Self {
            class_id,
            class_name: None,
            confidence,
            bbox,
        }
    }

    /// Attach an explicit class label.
    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Bounding box in pixel space.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_xyxy(self.bbox)
    }

    /// Class label: explicit name, COCO name, or the decimal id.
    pub fn resolved_class_name(&self) -> String {
        match &self.class_name {
            Some(name) => name.clone(),
            None => coco_class_name(self.class_id)
                .map(str::to_string)
                .unwrap_or_else(|| self.class_id.to_string()),
        }
    }
}

/// Detections supplied for a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetections {
    /// Detections in arrival order
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Detector inference time for this frame, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_ms: Option<f64>,
}

impl FrameDetections {
    /// Wrap a list of detections.
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            inference_ms: None,
        }
    }

    /// A frame with no detections.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_resolution() {
        let person = Detection::new(0, 0.9, [0.0, 0.0, 10.0, 10.0]);
        assert_eq!(person.resolved_class_name(), "person");

        let custom = Detection::new(0, 0.9, [0.0, 0.0, 10.0, 10.0]).with_class_name("speaker");
        assert_eq!(custom.resolved_class_name(), "speaker");

        let unknown = Detection::new(412, 0.9, [0.0, 0.0, 10.0, 10.0]);
        assert_eq!(unknown.resolved_class_name(), "412");
    }

    #[test]
    fn test_detection_wire_format() {
        let json = r#"{"class_id": 2, "confidence": 0.75, "bbox": [10.0, 20.0, 30.0, 60.0]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.class_id, 2);
        assert_eq!(detection.bounding_box().center(), (20.0, 40.0));
    }

    #[test]
    fn test_frame_detections_defaults() {
        let frame: FrameDetections = serde_json::from_str("{}").unwrap();
        assert!(frame.detections.is_empty());
        assert!(frame.inference_ms.is_none());
    }
}
