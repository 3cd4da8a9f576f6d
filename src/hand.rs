// src/hand.rs - Single-hand observation as delivered by the landmark tracker
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{GhostHandError, Result};

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// (tip, base knuckle) pairs for index, middle, ring, pinky.
pub const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Tracker labels are "Left"/"Right"; anything else is unknown.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub landmarks: [Vector2<f64>; LANDMARK_COUNT],
    pub handedness: Option<Handedness>,
}

impl HandObservation {
    pub fn new(landmarks: [Vector2<f64>; LANDMARK_COUNT], handedness: Option<Handedness>) -> Self {
        Self { landmarks, handedness }
    }

    /// Build from raw tracker output. Each point needs at least x and y;
    /// a trailing z (depth) is ignored.
    pub fn from_points<P: AsRef<[f64]>>(points: &[P], handedness: Option<Handedness>) -> Result<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(GhostHandError::MalformedFrame(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                points.len()
            )));
        }

        let mut landmarks = [Vector2::zeros(); LANDMARK_COUNT];
        for (i, point) in points.iter().enumerate() {
            let coords = point.as_ref();
            if coords.len() < 2 {
                return Err(GhostHandError::MalformedFrame(format!(
                    "landmark {} has {} coordinates",
                    i,
                    coords.len()
                )));
            }
            if !coords[0].is_finite() || !coords[1].is_finite() {
                return Err(GhostHandError::MalformedFrame(format!(
                    "landmark {} is not finite",
                    i
                )));
            }
            landmarks[i] = Vector2::new(coords[0], coords[1]);
        }

        Ok(Self { landmarks, handedness })
    }

    pub fn point(&self, index: usize) -> Vector2<f64> {
        self.landmarks[index]
    }

    pub fn wrist(&self) -> Vector2<f64> {
        self.landmarks[WRIST]
    }

    /// The cursor follows the index fingertip.
    pub fn cursor_source(&self) -> Vector2<f64> {
        self.landmarks[INDEX_TIP]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Upright right hand, palm toward a mirrored camera. `up` flags index,
    /// middle, ring, pinky; `click_ratio` places the thumb tip at that
    /// multiple of the wrist to index-knuckle distance.
    pub fn hand(wrist_x: f64, up: [bool; 4], click_ratio: f64) -> HandObservation {
        let wrist = Vector2::new(wrist_x, 0.8);
        let mut landmarks = [wrist; LANDMARK_COUNT];

        let knuckles = [
            (INDEX_MCP, Vector2::new(wrist_x - 0.05, 0.6)),
            (MIDDLE_MCP, Vector2::new(wrist_x - 0.017, 0.59)),
            (RING_MCP, Vector2::new(wrist_x + 0.017, 0.6)),
            (PINKY_MCP, Vector2::new(wrist_x + 0.05, 0.62)),
        ];
        for (i, &(mcp, at)) in knuckles.iter().enumerate() {
            landmarks[mcp] = at;
            let tip = FINGER_JOINTS[i].0;
            let dy = if up[i] { -0.15 } else { 0.05 };
            landmarks[tip] = at + Vector2::new(0.0, dy);
        }

        let scale = (landmarks[INDEX_MCP] - wrist).norm();
        landmarks[THUMB_TIP] = landmarks[INDEX_MCP] - Vector2::new(click_ratio * scale, 0.0);

        HandObservation::new(landmarks, Some(Handedness::Right))
    }

    pub fn open_palm(wrist_x: f64) -> HandObservation {
        hand(wrist_x, [true; 4], 0.6)
    }

    pub fn pointing(wrist_x: f64, click_ratio: f64) -> HandObservation {
        hand(wrist_x, [true, false, false, false], click_ratio)
    }
}
