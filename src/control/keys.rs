//! Operator command vocabulary and key mapping
//!
//! One discrete command per key press, mirroring the interactive bindings:
//! `m` cycle mode, `c` calibrate, `s` toggle smoothing, `+`/`-` adjust
//! speed, `q` quit. `SetMode` has no key; it arrives via IPC only.

use crate::state::ControlMode;

/// Discrete operator commands consumed by the pipeline task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Advance to the next control mode
    CycleMode,
    /// Jump to a specific mode (IPC request)
    SetMode(ControlMode),
    /// Begin collecting calibration samples
    StartCalibration,
    /// Toggle cursor smoothing
    ToggleSmoothing,
    /// Raise movement speed one notch
    SpeedUp,
    /// Lower movement speed one notch
    SpeedDown,
    /// Stop the daemon
    Quit,
}

impl ControlCommand {
    /// Map one input byte to a command; unbound keys map to nothing.
    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            b'm' | b'M' => Some(Self::CycleMode),
            b'c' | b'C' => Some(Self::StartCalibration),
            b's' | b'S' => Some(Self::ToggleSmoothing),
            b'+' => Some(Self::SpeedUp),
            b'-' => Some(Self::SpeedDown),
            b'q' | b'Q' => Some(Self::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_keys() {
        assert_eq!(ControlCommand::from_key(b'm'), Some(ControlCommand::CycleMode));
        assert_eq!(ControlCommand::from_key(b'M'), Some(ControlCommand::CycleMode));
        assert_eq!(
            ControlCommand::from_key(b'c'),
            Some(ControlCommand::StartCalibration)
        );
        assert_eq!(
            ControlCommand::from_key(b's'),
            Some(ControlCommand::ToggleSmoothing)
        );
        assert_eq!(ControlCommand::from_key(b'+'), Some(ControlCommand::SpeedUp));
        assert_eq!(ControlCommand::from_key(b'-'), Some(ControlCommand::SpeedDown));
        assert_eq!(ControlCommand::from_key(b'q'), Some(ControlCommand::Quit));
    }

    #[test]
    fn test_unbound_keys_ignored() {
        for key in [b'x', b'\n', b' ', b'0'] {
            assert_eq!(ControlCommand::from_key(key), None);
        }
    }
}
