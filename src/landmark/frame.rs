//! Landmark frame wire type and validation
//!
//! One frame per captured video frame, pushed by the external tracking
//! provider. A frame with no landmarks means no hand was detected.

use serde::{Deserialize, Serialize};

/// Number of landmarks in a complete hand skeleton
pub const LANDMARK_COUNT: usize = 21;

/// Fixed landmark roles within a 21-point frame
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A single tracked point, in the provider's frame coordinates.
///
/// The provider may send 2D points; `z` defaults to zero and is ignored by
/// the angle and distance computations, which work in the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// One hand observation: 21 ordered landmarks plus the tracker's own
/// detection confidence in [0, 1]. An empty `points` list is a valid
/// frame meaning "no hand this frame".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: Vec<Point>,
    pub confidence: f32,
}

/// Why a frame was rejected before classification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),

    #[error("detection confidence {0} outside [0, 1]")]
    ConfidenceRange(f32),
}

impl LandmarkFrame {
    /// Frame reporting no detected hand
    pub fn no_hand() -> Self {
        Self {
            points: Vec::new(),
            confidence: 0.0,
        }
    }

    /// True when the tracker reported no hand
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check the frame is a well-formed 21-point observation.
    ///
    /// Empty frames are handled before validation; here an empty list is
    /// just a wrong count.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongCount(self.points.len()));
        }
        for (i, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() || !p.z.is_finite() {
                return Err(FrameError::NonFinite(i));
            }
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(FrameError::ConfidenceRange(self.confidence));
        }
        Ok(())
    }

    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_frame() -> LandmarkFrame {
        LandmarkFrame {
            points: vec![Point::new(0.5, 0.5); LANDMARK_COUNT],
            confidence: 0.9,
        }
    }

    #[test]
    fn test_valid_frame_passes() {
        assert_eq!(valid_frame().validate(), Ok(()));
    }

    #[test]
    fn test_wrong_count_rejected() {
        let mut frame = valid_frame();
        frame.points.truncate(20);
        assert_eq!(frame.validate(), Err(FrameError::WrongCount(20)));
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let mut frame = valid_frame();
        frame.points[7].y = f32::NAN;
        assert_eq!(frame.validate(), Err(FrameError::NonFinite(7)));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut frame = valid_frame();
        frame.confidence = 1.5;
        assert_eq!(frame.validate(), Err(FrameError::ConfidenceRange(1.5)));
    }

    #[test]
    fn test_no_hand_frame_is_empty() {
        assert!(LandmarkFrame::no_hand().is_empty());
        assert!(!valid_frame().is_empty());
    }

    #[test]
    fn test_frame_deserializes_without_z() {
        let json = r#"{"points":[{"x":0.1,"y":0.2}],"confidence":0.8}"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.points[0].z, 0.0);
    }
}
