//! Debounce/confirmation gate
//!
//! Keeps the only cross-frame classification state: the last confirmed
//! timestamp per (mode, gesture). Keys are scoped by mode so a cooldown
//! left over in one mode cannot suppress the same gesture name in
//! another. Continuous gestures bypass the gate entirely and leave its
//! state untouched.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::state::ControlMode;

use super::types::{Gesture, GestureCandidate};

/// Outcome of gating one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Passed through; for discrete gestures the cooldown restarts now
    Confirmed,
    /// Score under the confidence threshold; nothing recorded
    BelowConfidence,
    /// Same gesture confirmed too recently; nothing recorded
    Cooldown,
}

pub struct DebounceGate {
    window: Duration,
    confidence_threshold: f32,
    last_confirmed: HashMap<(ControlMode, Gesture), Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration, confidence_threshold: f32) -> Self {
        Self {
            window,
            confidence_threshold,
            last_confirmed: HashMap::new(),
        }
    }

    /// Gate one candidate, judged at its own timestamp.
    ///
    /// A discrete candidate confirms when no confirmation of the same
    /// (mode, gesture) happened within the window: exactly at
    /// `last + window` it confirms again, one instant earlier it is
    /// suppressed.
    pub fn evaluate(&mut self, mode: ControlMode, candidate: &GestureCandidate) -> GateVerdict {
        if candidate.confidence < self.confidence_threshold {
            return GateVerdict::BelowConfidence;
        }

        if candidate.gesture.is_continuous() {
            return GateVerdict::Confirmed;
        }

        let key = (mode, candidate.gesture);
        if let Some(last) = self.last_confirmed.get(&key) {
            if candidate.at.duration_since(*last) < self.window {
                debug!(gesture = %candidate.gesture, mode = %mode, "suppressed by cooldown");
                return GateVerdict::Cooldown;
            }
        }

        self.last_confirmed.insert(key, candidate.at);
        GateVerdict::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> DebounceGate {
        DebounceGate::new(Duration::from_millis(300), 0.7)
    }

    fn candidate(gesture: Gesture, confidence: f32, at: Instant) -> GestureCandidate {
        GestureCandidate {
            gesture,
            confidence,
            at,
        }
    }

    #[test]
    fn test_window_boundary() {
        let mut gate = gate();
        let t0 = Instant::now();
        let click = |at| candidate(Gesture::LeftClick, 0.9, at);

        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &click(t0)),
            GateVerdict::Confirmed
        );

        // One millisecond short of the window: suppressed
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &click(t0 + Duration::from_millis(299))),
            GateVerdict::Cooldown
        );

        // Exactly at the window: confirmed again
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &click(t0 + Duration::from_millis(300))),
            GateVerdict::Confirmed
        );
    }

    #[test]
    fn test_suppression_does_not_extend_cooldown() {
        let mut gate = gate();
        let t0 = Instant::now();
        let click = |at| candidate(Gesture::LeftClick, 0.9, at);

        gate.evaluate(ControlMode::Mouse, &click(t0));

        // Suppressed attempts must not push the window forward
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &click(t0 + Duration::from_millis(250))),
            GateVerdict::Cooldown
        );
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &click(t0 + Duration::from_millis(310))),
            GateVerdict::Confirmed
        );
    }

    #[test]
    fn test_continuous_gesture_never_suppressed() {
        let mut gate = gate();
        let t0 = Instant::now();

        for i in 0..10 {
            let move_cursor =
                candidate(Gesture::MoveCursor, 0.9, t0 + Duration::from_millis(i * 16));
            assert_eq!(
                gate.evaluate(ControlMode::Mouse, &move_cursor),
                GateVerdict::Confirmed
            );
        }
    }

    #[test]
    fn test_low_confidence_unconfirmed_and_unrecorded() {
        let mut gate = gate();
        let t0 = Instant::now();

        let weak = candidate(Gesture::LeftClick, 0.4, t0);
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &weak),
            GateVerdict::BelowConfidence
        );

        // The weak candidate started no cooldown
        let strong = candidate(Gesture::LeftClick, 0.9, t0);
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &strong),
            GateVerdict::Confirmed
        );
    }

    #[test]
    fn test_cooldowns_scoped_per_mode() {
        let mut gate = gate();
        let t0 = Instant::now();
        let scroll = candidate(Gesture::ScrollUp, 0.9, t0);

        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &scroll),
            GateVerdict::Confirmed
        );
        // Same gesture name in a different mode is an independent key
        assert_eq!(
            gate.evaluate(ControlMode::Scroll, &scroll),
            GateVerdict::Confirmed
        );
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &scroll),
            GateVerdict::Cooldown
        );
    }

    #[test]
    fn test_distinct_gestures_do_not_share_cooldown() {
        let mut gate = gate();
        let t0 = Instant::now();

        gate.evaluate(ControlMode::Mouse, &candidate(Gesture::LeftClick, 0.9, t0));
        assert_eq!(
            gate.evaluate(ControlMode::Mouse, &candidate(Gesture::RightClick, 0.9, t0)),
            GateVerdict::Confirmed
        );
    }
}
