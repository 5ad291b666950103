//! Gesture vocabulary and classification result

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Recognized gesture names, closed per-mode vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Cursor follows the index fingertip; continuous, never debounced
    MoveCursor,
    LeftClick,
    RightClick,
    ScrollUp,
    ScrollDown,
    NextSlide,
    PreviousSlide,
}

impl Gesture {
    /// Continuous gestures re-fire every frame and bypass the debounce
    /// gate; suppressing them would stutter cursor tracking.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::MoveCursor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoveCursor => "move_cursor",
            Self::LeftClick => "left_click",
            Self::RightClick => "right_click",
            Self::ScrollUp => "scroll_up",
            Self::ScrollDown => "scroll_down",
            Self::NextSlide => "next_slide",
            Self::PreviousSlide => "previous_slide",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame's classification outcome. Frame-scoped; a candidate below the
/// confidence threshold is reported for display but never confirmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureCandidate {
    pub gesture: Gesture,
    /// Normalized match strength in [0, 1]
    pub confidence: f32,
    pub at: Instant,
}
