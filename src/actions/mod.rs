//! Action tokens and the gesture-to-action mapper

mod mapper;

pub use mapper::{ActionMapper, ActionToken};
