//! Gesture-to-action mapping
//!
//! Turns a confirmed gesture into at most one action token per frame. The
//! mapper owns the cursor interpolation state; it never touches the OS —
//! tokens go out over IPC for the action executor to perform.

use serde::{Deserialize, Serialize};

use crate::config::PointerConfig;
use crate::gesture::Gesture;

/// One OS-level effect, in frame coordinates where positional
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionToken {
    /// Move the cursor to an absolute position; the executor scales frame
    /// units to screen pixels
    MoveCursorTo { x: f32, y: f32 },
    LeftClick,
    RightClick,
    ScrollUp { steps: u32 },
    ScrollDown { steps: u32 },
    NextSlide,
    PreviousSlide,
}

impl std::fmt::Display for ActionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoveCursorTo { x, y } => write!(f, "move_cursor_to({x:.3}, {y:.3})"),
            Self::LeftClick => write!(f, "left_click"),
            Self::RightClick => write!(f, "right_click"),
            Self::ScrollUp { steps } => write!(f, "scroll_up({steps})"),
            Self::ScrollDown { steps } => write!(f, "scroll_down({steps})"),
            Self::NextSlide => write!(f, "next_slide"),
            Self::PreviousSlide => write!(f, "previous_slide"),
        }
    }
}

pub struct ActionMapper {
    movement_speed: f32,
    scroll_steps: u32,
    smoothing: bool,
    smoothing_factor: f32,
    /// Cursor position after the previous movement, frame units
    last_cursor: Option<(f32, f32)>,
}

impl ActionMapper {
    pub fn new(pointer: &PointerConfig) -> Self {
        Self {
            movement_speed: pointer.movement_speed,
            scroll_steps: pointer.scroll_speed,
            smoothing: pointer.smoothing,
            smoothing_factor: pointer.smoothing_factor,
            last_cursor: None,
        }
    }

    /// Map one confirmed gesture. `cursor_target` is the raw index
    /// fingertip for this frame.
    pub fn map(&mut self, gesture: Gesture, cursor_target: (f32, f32)) -> ActionToken {
        match gesture {
            Gesture::MoveCursor => self.move_cursor(cursor_target),
            Gesture::LeftClick => ActionToken::LeftClick,
            Gesture::RightClick => ActionToken::RightClick,
            Gesture::ScrollUp => ActionToken::ScrollUp {
                steps: self.scroll_steps,
            },
            Gesture::ScrollDown => ActionToken::ScrollDown {
                steps: self.scroll_steps,
            },
            Gesture::NextSlide => ActionToken::NextSlide,
            Gesture::PreviousSlide => ActionToken::PreviousSlide,
        }
    }

    /// Interpolate towards the raw target: movement speed scales the raw
    /// delta, then smoothing pulls the step back towards the previous
    /// position. The first sighting jumps straight to the target.
    fn move_cursor(&mut self, raw: (f32, f32)) -> ActionToken {
        let position = match self.last_cursor {
            None => raw,
            Some(prev) => {
                let target = (
                    prev.0 + (raw.0 - prev.0) * self.movement_speed,
                    prev.1 + (raw.1 - prev.1) * self.movement_speed,
                );
                if self.smoothing {
                    (
                        prev.0 + (target.0 - prev.0) * self.smoothing_factor,
                        prev.1 + (target.1 - prev.1) * self.smoothing_factor,
                    )
                } else {
                    target
                }
            }
        };

        self.last_cursor = Some(position);
        ActionToken::MoveCursorTo {
            x: position.0,
            y: position.1,
        }
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Toggle smoothing; returns the new setting
    pub fn toggle_smoothing(&mut self) -> bool {
        self.smoothing = !self.smoothing;
        self.smoothing
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Nudge the movement speed, clamped to the configured operating range
    pub fn adjust_speed(&mut self, delta: f32) -> f32 {
        self.movement_speed = (self.movement_speed + delta).clamp(0.1, 2.0);
        self.movement_speed
    }
}
