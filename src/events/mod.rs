//! Pipeline event vocabulary
//!
//! Broadcast for every classification, dispatch, mode change, and
//! calibration transition. Subscribed IPC clients (dashboard, action
//! executor) receive these as push notifications.

use serde::{Deserialize, Serialize};

use crate::actions::ActionToken;
use crate::calibration::LearnedThresholds;
use crate::gesture::Gesture;
use crate::state::ControlMode;

/// Events emitted by the pipeline task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A pose matched a gesture rule (confirmed or not); display data
    GestureDetected {
        gesture: Gesture,
        /// Normalized match strength in [0, 1]
        confidence: f32,
        mode: ControlMode,
    },

    /// A confirmed gesture produced an action token for the executor
    ActionDispatched {
        action: ActionToken,
        mode: ControlMode,
    },

    /// The control mode changed
    ModeChanged {
        from: ControlMode,
        to: ControlMode,
    },

    /// A calibration session began collecting samples
    CalibrationStarted,

    /// Calibration finished and these thresholds are now active
    CalibrationCompleted { thresholds: LearnedThresholds },
}

impl std::fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineEvent::GestureDetected {
                gesture,
                confidence,
                mode,
            } => write!(f, "GESTURE {gesture} ({confidence:.2}) [{mode}]"),
            PipelineEvent::ActionDispatched { action, mode } => {
                write!(f, "ACTION {action} [{mode}]")
            }
            PipelineEvent::ModeChanged { from, to } => {
                write!(f, "MODE {from} -> {to}")
            }
            PipelineEvent::CalibrationStarted => write!(f, "CALIBRATION_STARTED"),
            PipelineEvent::CalibrationCompleted { .. } => write!(f, "CALIBRATION_COMPLETED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = PipelineEvent::GestureDetected {
            gesture: Gesture::LeftClick,
            confidence: 0.85,
            mode: ControlMode::Mouse,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("gesture_detected"));
        assert!(json.contains("left_click"));
        assert!(json.contains("mouse"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"mode_changed","from":"mouse","to":"scroll"}"#;
        let event: PipelineEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            PipelineEvent::ModeChanged {
                from: ControlMode::Mouse,
                to: ControlMode::Scroll,
            }
        ));
    }

    #[test]
    fn test_action_event_round_trip() {
        let event = PipelineEvent::ActionDispatched {
            action: ActionToken::ScrollDown { steps: 3 },
            mode: ControlMode::Scroll,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PipelineEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            PipelineEvent::ActionDispatched {
                action: ActionToken::ScrollDown { steps: 3 },
                ..
            }
        ));
    }
}
