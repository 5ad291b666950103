//! Per-finger Extended/Curled/Neutral classification
//!
//! The four fingers classify by the joint angle at the PIP; the thumb does
//! not bend in the same plane, so it classifies by how far its tip sits
//! from the palm center, measured in hand spans. Both rules use a pair of
//! thresholds with a Neutral band between them so a finger hovering at the
//! boundary does not flap between states.

use crate::landmark::{
    distance, index, joint_angle, pointing_direction, LandmarkFrame, Point, PointingDirection,
};

/// Thumb, index, middle, ring, pinky
pub const FINGER_COUNT: usize = 5;

const EPSILON: f32 = 1e-6;

/// State of one finger for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerState {
    Extended,
    Curled,
    Neutral,
}

/// Classification thresholds, after hysteresis derivation.
///
/// Angles in degrees; thumb bounds in hand-span units. Invariants
/// (checked at config load): 0 < curled < extended < 180, and
/// 0 < thumb_curled_span < thumb_extended_span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerThresholds {
    /// PIP angle at or above which a finger reads Extended
    pub extended_angle_deg: f32,
    /// PIP angle at or below which a finger reads Curled
    pub curled_angle_deg: f32,
    /// Thumb tip-to-palm distance (in spans) at or above which the thumb
    /// reads Extended
    pub thumb_extended_span: f32,
    /// Thumb distance at or below which the thumb reads Curled
    pub thumb_curled_span: f32,
}

/// Extracted per-frame hand description consumed by the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct HandPose {
    /// One state per finger, thumb first
    pub states: [FingerState; FINGER_COUNT],
    /// Normalized margin in [0, 1] past the matching threshold; 0 for
    /// Neutral fingers
    pub margins: [f32; FINGER_COUNT],
    /// Raw measurement per finger: span ratio for the thumb, PIP angle in
    /// degrees for the rest. Kept for calibration.
    pub measurements: [f32; FINGER_COUNT],
    /// Dominant direction of the index distal segment
    pub pointing: Option<PointingDirection>,
    /// Index fingertip, the cursor target in frame coordinates
    pub index_tip: Point,
    /// Detection confidence fell below the configured floor
    pub low_confidence: bool,
    /// Multiplicative confidence penalty in (0, 1], 1 when not penalized
    pub penalty: f32,
}

/// Deterministic extractor; same frame in, same pose out
#[derive(Debug, Clone)]
pub struct FingerStateExtractor {
    thresholds: FingerThresholds,
    detection_confidence: f32,
}

/// (MCP, PIP, DIP) landmark indices for the four angle-classified fingers
const FINGER_JOINTS: [(usize, usize, usize); 4] = [
    (index::INDEX_MCP, index::INDEX_PIP, index::INDEX_DIP),
    (index::MIDDLE_MCP, index::MIDDLE_PIP, index::MIDDLE_DIP),
    (index::RING_MCP, index::RING_PIP, index::RING_DIP),
    (index::PINKY_MCP, index::PINKY_PIP, index::PINKY_DIP),
];

impl FingerStateExtractor {
    pub fn new(thresholds: FingerThresholds, detection_confidence: f32) -> Self {
        Self {
            thresholds,
            detection_confidence,
        }
    }

    pub fn thresholds(&self) -> &FingerThresholds {
        &self.thresholds
    }

    /// Replace the active thresholds (calibration hand-off)
    pub fn set_thresholds(&mut self, thresholds: FingerThresholds) {
        self.thresholds = thresholds;
    }

    /// Extract finger states from a validated 21-point frame.
    pub fn extract(&self, frame: &LandmarkFrame) -> HandPose {
        let mut states = [FingerState::Neutral; FINGER_COUNT];
        let mut margins = [0.0f32; FINGER_COUNT];
        let mut measurements = [0.0f32; FINGER_COUNT];

        let ratio = self.thumb_span_ratio(frame);
        let (state, margin) = self.classify_thumb(ratio);
        states[0] = state;
        margins[0] = margin;
        measurements[0] = ratio;

        for (slot, (mcp, pip, dip)) in FINGER_JOINTS.iter().enumerate() {
            let angle = joint_angle(frame.point(*mcp), frame.point(*pip), frame.point(*dip));
            let (state, margin) = self.classify_angle(angle);
            states[slot + 1] = state;
            margins[slot + 1] = margin;
            measurements[slot + 1] = angle;
        }

        let (penalty, low_confidence) = self.confidence_penalty(frame.confidence);

        HandPose {
            states,
            margins,
            measurements,
            pointing: pointing_direction(
                frame.point(index::INDEX_DIP),
                frame.point(index::INDEX_TIP),
            ),
            index_tip: frame.point(index::INDEX_TIP),
            low_confidence,
            penalty,
        }
    }

    /// Thumb tip-to-palm-center distance in hand spans. A collapsed hand
    /// (zero span) reads as ratio 0.
    fn thumb_span_ratio(&self, frame: &LandmarkFrame) -> f32 {
        let wrist = frame.point(index::WRIST);
        let middle_mcp = frame.point(index::MIDDLE_MCP);
        let span = distance(wrist, middle_mcp);
        if span < EPSILON {
            return 0.0;
        }
        let palm_center = Point::new(
            (wrist.x + middle_mcp.x) / 2.0,
            (wrist.y + middle_mcp.y) / 2.0,
        );
        distance(frame.point(index::THUMB_TIP), palm_center) / span
    }

    fn classify_angle(&self, angle: f32) -> (FingerState, f32) {
        let t = &self.thresholds;
        if angle >= t.extended_angle_deg {
            let margin = (angle - t.extended_angle_deg) / (180.0 - t.extended_angle_deg);
            (FingerState::Extended, margin.clamp(0.0, 1.0))
        } else if angle <= t.curled_angle_deg {
            let margin = (t.curled_angle_deg - angle) / t.curled_angle_deg;
            (FingerState::Curled, margin.clamp(0.0, 1.0))
        } else {
            (FingerState::Neutral, 0.0)
        }
    }

    fn classify_thumb(&self, ratio: f32) -> (FingerState, f32) {
        let t = &self.thresholds;
        if ratio >= t.thumb_extended_span {
            let margin = (ratio - t.thumb_extended_span) / t.thumb_extended_span;
            (FingerState::Extended, margin.clamp(0.0, 1.0))
        } else if ratio <= t.thumb_curled_span {
            let margin = (t.thumb_curled_span - ratio) / t.thumb_curled_span;
            (FingerState::Curled, margin.clamp(0.0, 1.0))
        } else {
            (FingerState::Neutral, 0.0)
        }
    }

    fn confidence_penalty(&self, confidence: f32) -> (f32, bool) {
        if confidence < self.detection_confidence {
            let penalty = (confidence / self.detection_confidence).clamp(0.0, 1.0);
            (penalty, true)
        } else {
            (1.0, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::testkit;
    use FingerState::{Curled, Extended, Neutral};

    fn extractor() -> FingerStateExtractor {
        FingerStateExtractor::new(
            FingerThresholds {
                extended_angle_deg: 90.0,
                curled_angle_deg: 50.0,
                thumb_extended_span: 0.9,
                thumb_curled_span: 0.7,
            },
            0.7,
        )
    }

    #[test]
    fn test_states_match_constructed_hand() {
        let frame = testkit::hand([Curled, Extended, Curled, Neutral, Extended]);
        let pose = extractor().extract(&frame);
        assert_eq!(pose.states, [Curled, Extended, Curled, Neutral, Extended]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let frame = testkit::hand([Extended, Extended, Curled, Curled, Curled]);
        let ex = extractor();
        assert_eq!(ex.extract(&frame), ex.extract(&frame));
    }

    #[test]
    fn test_neutral_band_has_zero_margin() {
        let frame = testkit::hand([Neutral, Neutral, Neutral, Neutral, Neutral]);
        let pose = extractor().extract(&frame);
        assert_eq!(pose.states, [Neutral; 5]);
        assert_eq!(pose.margins, [0.0; 5]);
    }

    #[test]
    fn test_extended_fingers_have_positive_margin() {
        let frame = testkit::hand([Extended, Extended, Extended, Extended, Extended]);
        let pose = extractor().extract(&frame);
        for (i, margin) in pose.margins.iter().enumerate() {
            assert!(*margin > 0.0, "finger {i} margin {margin}");
            assert!(*margin <= 1.0);
        }
    }

    #[test]
    fn test_full_confidence_frame_has_no_penalty() {
        let frame = testkit::hand_with([Curled; 5], (0.0, -1.0), 0.95);
        let pose = extractor().extract(&frame);
        assert!(!pose.low_confidence);
        assert_eq!(pose.penalty, 1.0);
    }

    #[test]
    fn test_low_confidence_frame_is_penalized() {
        let frame = testkit::hand_with([Curled; 5], (0.0, -1.0), 0.35);
        let pose = extractor().extract(&frame);
        assert!(pose.low_confidence);
        assert!((pose.penalty - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pointing_direction_follows_index_chain() {
        let up = testkit::hand([Curled, Extended, Curled, Curled, Curled]);
        assert_eq!(
            extractor().extract(&up).pointing,
            Some(crate::landmark::PointingDirection::Up)
        );

        let right = testkit::hand_pointing([Curled, Extended, Curled, Curled, Curled], (1.0, 0.0));
        assert_eq!(
            extractor().extract(&right).pointing,
            Some(crate::landmark::PointingDirection::Right)
        );
    }

    #[test]
    fn test_wider_angle_never_lowers_margin() {
        let ex = extractor();
        let mut last = -1.0f32;
        for angle in [95.0, 110.0, 130.0, 160.0, 179.0] {
            let (state, margin) = ex.classify_angle(angle);
            assert_eq!(state, Extended);
            assert!(margin >= last, "margin fell at {angle}");
            last = margin;
        }
    }
}
