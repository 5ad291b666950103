//! Hand landmark frames and the geometry primitives computed over them

mod frame;
mod geometry;

pub use frame::{index, FrameError, LandmarkFrame, Point, LANDMARK_COUNT};
pub use geometry::{distance, joint_angle, pointing_direction, PointingDirection};
