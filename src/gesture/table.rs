//! Static gesture lookup table
//!
//! Rules are exact five-finger patterns, optionally constrained by a
//! pointing direction, scoped to one control mode. The table is fixed at
//! startup and validated once: two rules in the same mode must never be
//! satisfiable by the same pose.

use crate::hand::{FingerState, FINGER_COUNT};
use crate::landmark::PointingDirection;
use crate::state::ControlMode;

use super::types::Gesture;

/// One entry of the lookup table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureRule {
    pub mode: ControlMode,
    /// Required state per finger, thumb first. Neutral is not a valid
    /// pattern element; a Neutral finger matches no rule.
    pub pattern: [FingerState; FINGER_COUNT],
    /// Required pointing direction of the index finger, if any
    pub direction: Option<PointingDirection>,
    pub gesture: Gesture,
}

/// Table construction defects, caught before the first frame
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("rule for {gesture} uses Neutral in its finger pattern")]
    NeutralInPattern { gesture: Gesture },

    #[error("rules for {first} and {second} overlap in {mode} mode")]
    OverlappingRules {
        mode: ControlMode,
        first: Gesture,
        second: Gesture,
    },
}

#[derive(Debug, Clone)]
pub struct GestureTable {
    rules: Vec<GestureRule>,
}

impl GestureTable {
    /// The built-in mode tables.
    pub fn standard() -> Self {
        use ControlMode::{Mouse, Presentation, Scroll};
        use FingerState::{Curled as C, Extended as E};
        use PointingDirection::{Down, Left, Right, Up};

        let rule = |mode, pattern, direction, gesture| GestureRule {
            mode,
            pattern,
            direction,
            gesture,
        };

        Self {
            rules: vec![
                // Finger order: thumb, index, middle, ring, pinky
                rule(Mouse, [C, E, C, C, C], None, Gesture::MoveCursor),
                rule(Mouse, [C, C, E, C, C], None, Gesture::LeftClick),
                rule(Mouse, [E, E, C, C, C], None, Gesture::RightClick),
                rule(Mouse, [C, E, E, E, C], None, Gesture::ScrollUp),
                rule(Mouse, [C, E, E, C, C], Some(Down), Gesture::ScrollDown),
                rule(Scroll, [C, E, E, C, C], Some(Up), Gesture::ScrollUp),
                rule(Scroll, [C, E, E, C, C], Some(Down), Gesture::ScrollDown),
                rule(Presentation, [C, E, C, C, C], Some(Right), Gesture::NextSlide),
                rule(Presentation, [C, E, C, C, C], Some(Left), Gesture::PreviousSlide),
            ],
        }
    }

    pub fn with_rules(rules: Vec<GestureRule>) -> Self {
        Self { rules }
    }

    /// Verify no pose can satisfy two rules. Two same-mode rules overlap
    /// when their patterns are equal and their direction requirements are
    /// compatible (equal, or either side unconstrained).
    pub fn validate(&self) -> Result<(), TableError> {
        for rule in &self.rules {
            if rule.pattern.contains(&FingerState::Neutral) {
                return Err(TableError::NeutralInPattern {
                    gesture: rule.gesture,
                });
            }
        }

        for (i, a) in self.rules.iter().enumerate() {
            for b in &self.rules[i + 1..] {
                if a.mode != b.mode || a.pattern != b.pattern {
                    continue;
                }
                let compatible = match (a.direction, b.direction) {
                    (Some(da), Some(db)) => da == db,
                    _ => true,
                };
                if compatible {
                    return Err(TableError::OverlappingRules {
                        mode: a.mode,
                        first: a.gesture,
                        second: b.gesture,
                    });
                }
            }
        }

        Ok(())
    }

    /// Exact-pattern lookup for one pose
    pub fn lookup(
        &self,
        mode: ControlMode,
        states: &[FingerState; FINGER_COUNT],
        pointing: Option<PointingDirection>,
    ) -> Option<&GestureRule> {
        self.rules.iter().find(|rule| {
            rule.mode == mode
                && rule.pattern == *states
                && match rule.direction {
                    None => true,
                    Some(required) => pointing == Some(required),
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FingerState::{Curled as C, Extended as E, Neutral};

    #[test]
    fn test_standard_table_is_valid() {
        assert_eq!(GestureTable::standard().validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_pattern_rejected() {
        let pattern = [C, E, C, C, C];
        let table = GestureTable::with_rules(vec![
            GestureRule {
                mode: ControlMode::Mouse,
                pattern,
                direction: None,
                gesture: Gesture::MoveCursor,
            },
            GestureRule {
                mode: ControlMode::Mouse,
                pattern,
                direction: Some(PointingDirection::Up),
                gesture: Gesture::LeftClick,
            },
        ]);

        // An unconstrained rule swallows every direction-constrained twin.
        assert!(matches!(
            table.validate(),
            Err(TableError::OverlappingRules { .. })
        ));
    }

    #[test]
    fn test_same_pattern_distinct_directions_allowed() {
        let pattern = [C, E, E, C, C];
        let table = GestureTable::with_rules(vec![
            GestureRule {
                mode: ControlMode::Scroll,
                pattern,
                direction: Some(PointingDirection::Up),
                gesture: Gesture::ScrollUp,
            },
            GestureRule {
                mode: ControlMode::Scroll,
                pattern,
                direction: Some(PointingDirection::Down),
                gesture: Gesture::ScrollDown,
            },
        ]);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn test_same_pattern_across_modes_allowed() {
        // MoveCursor in Mouse and NextSlide in Presentation share the
        // index-only pattern in the standard table.
        assert_eq!(GestureTable::standard().validate(), Ok(()));
    }

    #[test]
    fn test_neutral_in_pattern_rejected() {
        let table = GestureTable::with_rules(vec![GestureRule {
            mode: ControlMode::Mouse,
            pattern: [C, E, Neutral, C, C],
            direction: None,
            gesture: Gesture::LeftClick,
        }]);
        assert_eq!(
            table.validate(),
            Err(TableError::NeutralInPattern {
                gesture: Gesture::LeftClick
            })
        );
    }

    #[test]
    fn test_lookup_matches_exact_pattern() {
        let table = GestureTable::standard();
        let rule = table
            .lookup(ControlMode::Mouse, &[C, E, C, C, C], None)
            .unwrap();
        assert_eq!(rule.gesture, Gesture::MoveCursor);
    }

    #[test]
    fn test_lookup_respects_mode() {
        let table = GestureTable::standard();
        assert!(table
            .lookup(ControlMode::Scroll, &[C, E, C, C, C], None)
            .is_none());
    }

    #[test]
    fn test_lookup_requires_direction() {
        let table = GestureTable::standard();
        let states = [C, E, E, C, C];

        let up = table.lookup(
            ControlMode::Scroll,
            &states,
            Some(PointingDirection::Up),
        );
        assert_eq!(up.unwrap().gesture, Gesture::ScrollUp);

        let down = table.lookup(
            ControlMode::Scroll,
            &states,
            Some(PointingDirection::Down),
        );
        assert_eq!(down.unwrap().gesture, Gesture::ScrollDown);

        assert!(table.lookup(ControlMode::Scroll, &states, None).is_none());
    }

    #[test]
    fn test_neutral_finger_matches_nothing() {
        let table = GestureTable::standard();
        assert!(table
            .lookup(ControlMode::Mouse, &[Neutral, E, C, C, C], None)
            .is_none());
    }
}
