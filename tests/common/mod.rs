#![allow(dead_code)]

use ghost_hand::hand::LANDMARK_COUNT;
use ghost_hand::mediapipe_bridge::{LandmarkFrame, RecordedFrame};
use ghost_hand::{HandObservation, Handedness};

/// Upright right hand facing a mirrored camera. `up` flags index, middle,
/// ring, pinky; the thumb tip sits `click_ratio` hand-widths from the
/// index knuckle.
pub fn hand(wrist_x: f64, up: [bool; 4], click_ratio: f64) -> HandObservation {
    let mut points = vec![[wrist_x, 0.8]; LANDMARK_COUNT];

    let knuckles = [
        (5, 8, wrist_x - 0.05, 0.6),
        (9, 12, wrist_x - 0.017, 0.59),
        (13, 16, wrist_x + 0.017, 0.6),
        (17, 20, wrist_x + 0.05, 0.62),
    ];
    for (i, &(mcp, tip, x, y)) in knuckles.iter().enumerate() {
        points[mcp] = [x, y];
        points[tip] = [x, if up[i] { y - 0.15 } else { y + 0.05 }];
    }

    let scale = (0.05f64.powi(2) + 0.2f64.powi(2)).sqrt();
    points[4] = [wrist_x - 0.05 - click_ratio * scale, 0.6];

    HandObservation::from_points(&points, Some(Handedness::Right)).unwrap()
}

pub fn open_palm(wrist_x: f64) -> HandObservation {
    hand(wrist_x, [true; 4], 0.6)
}

pub fn pointing(wrist_x: f64, click_ratio: f64) -> HandObservation {
    hand(wrist_x, [true, false, false, false], click_ratio)
}

pub fn frame(timestamp: f64, hand: Option<HandObservation>) -> LandmarkFrame {
    LandmarkFrame { timestamp, hand }
}

pub fn jsonl(frames: &[LandmarkFrame]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(&RecordedFrame::from_frame(f)).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}
