//! Control-mode state machine module
//!
//! Provides the three control modes and the machine that owns the active
//! one:
//! - Mouse: cursor movement, clicks, scroll shortcuts
//! - Scroll: directional scrolling
//! - Presentation: slide navigation

mod machine;

pub use machine::{ControlMode, ModeMachine};
