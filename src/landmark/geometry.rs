//! Geometry primitives over landmark points
//!
//! All angle math works in the image plane (x right, y down, as delivered
//! by the tracking provider) and degrees.

use super::frame::Point;

/// Below this a vector is treated as zero-length
const EPSILON: f32 = 1e-6;

/// Angle at `vertex` between the rays towards `a` and `c`, in degrees
/// within [0, 180].
///
/// Coincident points produce zero-length rays; those return the sentinel
/// angle 0 rather than an error, and show up downstream as a curled
/// reading with no margin.
pub fn joint_angle(a: Point, vertex: Point, c: Point) -> f32 {
    let (vax, vay) = (a.x - vertex.x, a.y - vertex.y);
    let (vcx, vcy) = (c.x - vertex.x, c.y - vertex.y);

    let norm_a = (vax * vax + vay * vay).sqrt();
    let norm_c = (vcx * vcx + vcy * vcy).sqrt();
    if norm_a < EPSILON || norm_c < EPSILON {
        return 0.0;
    }

    let cos = ((vax * vcx + vay * vcy) / (norm_a * norm_c)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Euclidean distance between two landmarks, in frame units
pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Dominant direction of a fingertip segment in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointingDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Classify the direction of the segment `from -> to` by its dominant
/// axis. `None` when the segment is degenerate. Image y grows downward,
/// so a negative dy points up.
pub fn pointing_direction(from: Point, to: Point) -> Option<PointingDirection> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() < EPSILON && dy.abs() < EPSILON {
        return None;
    }

    if dx.abs() >= dy.abs() {
        Some(if dx > 0.0 {
            PointingDirection::Right
        } else {
            PointingDirection::Left
        })
    } else {
        Some(if dy < 0.0 {
            PointingDirection::Up
        } else {
            PointingDirection::Down
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_joint_is_180() {
        let angle = joint_angle(
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 2.0),
        );
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_angle_is_90() {
        let angle = joint_angle(
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
        );
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_folded_joint_is_0() {
        let angle = joint_angle(
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.5),
        );
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_input_returns_sentinel() {
        let p = Point::new(0.3, 0.3);
        assert_eq!(joint_angle(p, p, Point::new(0.5, 0.5)), 0.0);
        assert_eq!(joint_angle(p, p, p), 0.0);
    }

    #[test]
    fn test_distance() {
        let d = distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_pointing_up_in_image_coords() {
        let dir = pointing_direction(Point::new(0.5, 0.5), Point::new(0.5, 0.3));
        assert_eq!(dir, Some(PointingDirection::Up));
    }

    #[test]
    fn test_pointing_right_dominates_small_vertical() {
        let dir = pointing_direction(Point::new(0.2, 0.5), Point::new(0.5, 0.45));
        assert_eq!(dir, Some(PointingDirection::Right));
    }

    #[test]
    fn test_degenerate_segment_has_no_direction() {
        let p = Point::new(0.4, 0.4);
        assert_eq!(pointing_direction(p, p), None);
    }
}
