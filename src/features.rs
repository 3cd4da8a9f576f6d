// src/features.rs - Per-frame hand features for gesture classification
use nalgebra::Vector2;

use crate::hand::{HandObservation, Handedness, FINGER_JOINTS, INDEX_MCP, PINKY_MCP, THUMB_TIP, WRIST};

pub const DEFAULT_CLICK_THRESHOLD: f64 = 0.20;

/// Floor on the wrist to index-knuckle distance used as the hand scale.
const MIN_SCALE_REF: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    /// Index, middle, ring, pinky.
    pub finger_up: [bool; 4],
    pub fingers_open_count: usize,
    pub is_palm_facing: bool,
    pub click_ratio: f64,
    pub is_thumb_closed: bool,
    pub wrist_x: f64,
}

impl HandFeatures {
    pub fn extract(obs: &HandObservation, click_threshold: f64) -> Self {
        let mut finger_up = [false; 4];
        for (flag, &(tip, mcp)) in finger_up.iter_mut().zip(FINGER_JOINTS.iter()) {
            // Image y grows downward, so "up" means a smaller y than the knuckle
            *flag = obs.point(tip).y < obs.point(mcp).y;
        }
        let fingers_open_count = finger_up.iter().filter(|up| **up).count();

        let click_ratio = click_ratio(obs);

        Self {
            finger_up,
            fingers_open_count,
            is_palm_facing: is_palm_facing(obs),
            click_ratio,
            is_thumb_closed: click_ratio < click_threshold,
            wrist_x: obs.point(WRIST).x,
        }
    }

    pub fn index_up(&self) -> bool {
        self.finger_up[0]
    }

    pub fn middle_up(&self) -> bool {
        self.finger_up[1]
    }

    pub fn ring_up(&self) -> bool {
        self.finger_up[2]
    }

    pub fn pinky_up(&self) -> bool {
        self.finger_up[3]
    }

    /// Strictly the index finger extended.
    pub fn is_tracking_pose(&self) -> bool {
        self.index_up() && !self.middle_up() && !self.ring_up() && !self.pinky_up()
    }

    /// Index and middle extended, ring and pinky curled. The thumb is not
    /// checked so both the "gun" and "peace" shapes scroll.
    pub fn is_scroll_pose(&self) -> bool {
        self.index_up() && self.middle_up() && !self.ring_up() && !self.pinky_up()
    }
}

/// Winding order of wrist -> index knuckle -> pinky knuckle, assuming a
/// mirrored (selfie) frame. Unknown handedness counts as palm facing.
pub fn is_palm_facing(obs: &HandObservation) -> bool {
    let wrist = obs.point(WRIST);
    let to_index = obs.point(INDEX_MCP) - wrist;
    let to_pinky = obs.point(PINKY_MCP) - wrist;
    let cross = cross_2d(&to_index, &to_pinky);

    match obs.handedness {
        Some(Handedness::Right) => cross > 0.0,
        Some(Handedness::Left) => cross < 0.0,
        None => true,
    }
}

/// Thumb tip to index knuckle distance, normalised by hand size in frame.
pub fn click_ratio(obs: &HandObservation) -> f64 {
    let index_mcp = obs.point(INDEX_MCP);
    let scale_ref = (obs.point(WRIST) - index_mcp).norm().max(MIN_SCALE_REF);
    (obs.point(THUMB_TIP) - index_mcp).norm() / scale_ref
}

fn cross_2d(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::fixtures::{hand, open_palm, pointing};

    #[test]
    fn test_finger_flags() {
        let f = HandFeatures::extract(&hand(0.5, [true, true, false, false], 0.6), DEFAULT_CLICK_THRESHOLD);
        assert_eq!(f.finger_up, [true, true, false, false]);
        assert_eq!(f.fingers_open_count, 2);
        assert!(f.is_scroll_pose());
        assert!(!f.is_tracking_pose());
    }

    #[test]
    fn test_tracking_pose_requires_only_index() {
        let f = HandFeatures::extract(&pointing(0.5, 0.6), DEFAULT_CLICK_THRESHOLD);
        assert!(f.is_tracking_pose());
        assert!(!f.is_scroll_pose());

        let f = HandFeatures::extract(&hand(0.5, [true, false, false, true], 0.6), DEFAULT_CLICK_THRESHOLD);
        assert!(!f.is_tracking_pose());
        assert!(!f.is_scroll_pose());
    }

    #[test]
    fn test_palm_facing_by_handedness() {
        let mut obs = open_palm(0.5);
        assert!(is_palm_facing(&obs));

        // Same geometry reported as a left hand is the back of the hand
        obs.handedness = Some(Handedness::Left);
        assert!(!is_palm_facing(&obs));

        obs.handedness = None;
        assert!(is_palm_facing(&obs));
    }

    #[test]
    fn test_click_ratio_is_scale_invariant() {
        let near = pointing(0.5, 0.1);
        let mut far = near.clone();
        let anchor = far.wrist();
        for p in far.landmarks.iter_mut() {
            *p = anchor + (*p - anchor) * 0.5;
        }
        let a = click_ratio(&near);
        let b = click_ratio(&far);
        assert!((a - 0.1).abs() < 1e-9);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_click_ratio_floor_on_degenerate_hand() {
        let mut obs = pointing(0.5, 0.1);
        obs.landmarks[INDEX_MCP] = obs.wrist();
        obs.landmarks[THUMB_TIP] = obs.wrist() + Vector2::new(0.005, 0.0);
        let ratio = click_ratio(&obs);
        assert!(ratio.is_finite());
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_thumb_closed_against_threshold() {
        let closed = HandFeatures::extract(&pointing(0.5, 0.10), 0.20);
        let open = HandFeatures::extract(&pointing(0.5, 0.25), 0.20);
        assert!(closed.is_thumb_closed);
        assert!(!open.is_thumb_closed);
    }
}
