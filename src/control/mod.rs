//! Operator command intake
//!
//! Discrete mode-cycle, calibration, and tuning commands from the
//! interactive keyboard; the same commands also arrive via IPC.

mod keys;
mod listener;

pub use keys::ControlCommand;
pub use listener::{CommandListener, ControlError};
