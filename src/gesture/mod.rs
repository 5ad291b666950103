//! Gesture classification: vocabulary, lookup table, scoring, debounce

mod classifier;
mod debounce;
mod table;
mod types;

pub use classifier::Classifier;
pub use debounce::{DebounceGate, GateVerdict};
pub use table::{GestureRule, GestureTable, TableError};
pub use types::{Gesture, GestureCandidate};
