//! Pose-to-gesture classification
//!
//! Pure table lookup plus confidence scoring. Confidence is the mean of
//! the per-finger normalized threshold margins, scaled by the frame's
//! detection-confidence penalty, so a pose barely past its thresholds on
//! a shaky detection scores low while a clean, decisive pose scores high.

use std::time::Instant;

use tracing::trace;

use crate::hand::{HandPose, FINGER_COUNT};
use crate::state::ControlMode;

use super::table::{GestureTable, TableError};
use super::types::GestureCandidate;

pub struct Classifier {
    table: GestureTable,
}

impl Classifier {
    /// Build a classifier over a validated table. Overlapping rules are a
    /// configuration defect and refuse to start.
    pub fn new(table: GestureTable) -> Result<Self, TableError> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Classify one extracted pose under the active mode. `None` when no
    /// rule matches.
    pub fn classify(
        &self,
        mode: ControlMode,
        pose: &HandPose,
        now: Instant,
    ) -> Option<GestureCandidate> {
        let rule = self.table.lookup(mode, &pose.states, pose.pointing)?;

        let margin_mean: f32 = pose.margins.iter().sum::<f32>() / FINGER_COUNT as f32;
        let confidence = (margin_mean * pose.penalty).clamp(0.0, 1.0);

        trace!(
            gesture = %rule.gesture,
            confidence = confidence,
            penalized = pose.low_confidence,
            "pose matched"
        );

        Some(GestureCandidate {
            gesture: rule.gesture,
            confidence,
            at: now,
        })
    }
}
