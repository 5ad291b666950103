//! Finger-state extraction from a landmark frame

mod extractor;

pub use extractor::{
    FingerState, FingerStateExtractor, FingerThresholds, HandPose, FINGER_COUNT,
};

/// Synthetic hand frames for tests. Fingers are built as straight,
/// folded-back, or half-bent joint chains so the extractor classifies
/// them as Extended, Curled, or Neutral under the default thresholds.
#[cfg(test)]
pub(crate) mod testkit {
    use super::FingerState;
    use crate::landmark::{index, LandmarkFrame, Point};

    fn offset(p: Point, dir: (f32, f32), len: f32) -> Point {
        Point::new(p.x + dir.0 * len, p.y + dir.1 * len)
    }

    fn normalize(dir: (f32, f32)) -> (f32, f32) {
        let norm = (dir.0 * dir.0 + dir.1 * dir.1).sqrt().max(1e-6);
        (dir.0 / norm, dir.1 / norm)
    }

    fn rotate(dir: (f32, f32), degrees: f32) -> (f32, f32) {
        let rad = degrees.to_radians();
        (
            dir.0 * rad.cos() - dir.1 * rad.sin(),
            dir.0 * rad.sin() + dir.1 * rad.cos(),
        )
    }

    /// Hand with the given finger states, index finger pointing up
    pub fn hand(states: [FingerState; 5]) -> LandmarkFrame {
        hand_with(states, (0.0, -1.0), 0.95)
    }

    /// Hand with the index finger chain laid along `index_dir`
    pub fn hand_pointing(states: [FingerState; 5], index_dir: (f32, f32)) -> LandmarkFrame {
        hand_with(states, index_dir, 0.95)
    }

    pub fn hand_with(
        states: [FingerState; 5],
        index_dir: (f32, f32),
        confidence: f32,
    ) -> LandmarkFrame {
        let mut points = vec![Point::new(0.0, 0.0); 21];
        points[index::WRIST] = Point::new(0.5, 0.9);

        // Thumb tip placed by distance from the palm center (0.49, 0.75);
        // the hand span (wrist to middle MCP) is ~0.30.
        points[index::THUMB_CMC] = Point::new(0.44, 0.84);
        points[index::THUMB_MCP] = Point::new(0.40, 0.78);
        let thumb_tip = match states[0] {
            FingerState::Extended => Point::new(0.10, 0.60), // ratio ~1.39
            FingerState::Curled => Point::new(0.45, 0.72),   // ratio ~0.17
            FingerState::Neutral => Point::new(0.25, 0.74),  // ratio ~0.80
        };
        points[index::THUMB_IP] = Point::new(
            (points[index::THUMB_MCP].x + thumb_tip.x) / 2.0,
            (points[index::THUMB_MCP].y + thumb_tip.y) / 2.0,
        );
        points[index::THUMB_TIP] = thumb_tip;

        let bases = [
            (index::INDEX_MCP, 0.42f32),
            (index::MIDDLE_MCP, 0.48),
            (index::RING_MCP, 0.54),
            (index::PINKY_MCP, 0.60),
        ];
        for (slot, (mcp_idx, x)) in bases.iter().enumerate() {
            let dir = if slot == 0 {
                normalize(index_dir)
            } else {
                (0.0, -1.0)
            };
            let mcp = Point::new(*x, 0.6);
            let pip = offset(mcp, dir, 0.1);
            let (dip, tip) = match states[slot + 1] {
                // Straight chain: 180 deg at the PIP
                FingerState::Extended => (offset(pip, dir, 0.1), offset(pip, dir, 0.2)),
                // Tip folded back towards the MCP: 0 deg at the PIP
                FingerState::Curled => (offset(pip, dir, -0.05), offset(pip, dir, -0.1)),
                // Bent 70 deg away from the proximal segment
                FingerState::Neutral => {
                    let bent = rotate((-dir.0, -dir.1), 70.0);
                    (offset(pip, bent, 0.08), offset(pip, bent, 0.16))
                }
            };
            points[*mcp_idx] = mcp;
            points[mcp_idx + 1] = pip;
            points[mcp_idx + 2] = dip;
            points[mcp_idx + 3] = tip;
        }

        LandmarkFrame { points, confidence }
    }
}
