//! Control-mode state machine
//!
//! Holds the single process-wide control mode. Transitions happen only on
//! explicit operator commands (cycle key, IPC request), never from gesture
//! classification, and always follow the fixed cycling order
//! Mouse -> Scroll -> Presentation -> Mouse.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use crate::events::PipelineEvent;

/// The active gesture-to-action table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Cursor movement, clicks, and scroll shortcuts
    Mouse,
    /// Directional scrolling
    Scroll,
    /// Slide navigation
    Presentation,
}

impl Default for ControlMode {
    fn default() -> Self {
        Self::Mouse
    }
}

impl ControlMode {
    /// Next mode in the fixed cycling order
    pub fn next(self) -> Self {
        match self {
            Self::Mouse => Self::Scroll,
            Self::Scroll => Self::Presentation,
            Self::Presentation => Self::Mouse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Scroll => "scroll",
            Self::Presentation => "presentation",
        }
    }
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the active mode and announces transitions
pub struct ModeMachine {
    mode: ControlMode,
    /// Time the current mode was entered
    entered_at: Instant,
    /// Channel for emitting mode-change events
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl ModeMachine {
    pub fn new(initial: ControlMode, event_tx: broadcast::Sender<PipelineEvent>) -> Self {
        Self {
            mode: initial,
            entered_at: Instant::now(),
            event_tx,
        }
    }

    /// Get the current mode
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Advance to the next mode in the cycling order
    pub fn cycle(&mut self) {
        self.transition_to(self.mode.next());
    }

    /// Jump directly to a mode (IPC request)
    pub fn set(&mut self, mode: ControlMode) {
        if mode != self.mode {
            self.transition_to(mode);
        }
    }

    fn transition_to(&mut self, new_mode: ControlMode) {
        let old_mode = self.mode;
        let duration_ms = self.entered_at.elapsed().as_millis() as u64;

        info!(
            from = %old_mode,
            to = %new_mode,
            duration_ms = duration_ms,
            "mode transition"
        );

        self.mode = new_mode;
        self.entered_at = Instant::now();

        let _ = self.event_tx.send(PipelineEvent::ModeChanged {
            from: old_mode,
            to: new_mode,
        });
    }
}
