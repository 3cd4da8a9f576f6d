// src/mediapipe_bridge.rs - Landmark frames from the hand tracker, live or recorded
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GhostHandError, Result};
use crate::hand::{HandObservation, Handedness};

/// One tick of tracker output. `hand` is `None` when no hand was found.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Seconds since the start of the stream.
    pub timestamp: f64,
    pub hand: Option<HandObservation>,
}

pub trait LandmarkSource {
    /// `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

/// Wire format of one recorded frame (one JSON object per line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub timestamp: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub handedness: Option<String>,
}

impl RecordedFrame {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        Self {
            timestamp: frame.timestamp,
            landmarks: frame.hand.as_ref().map(|hand| {
                hand.landmarks.iter().map(|p| vec![p.x, p.y]).collect()
            }),
            handedness: frame
                .hand
                .as_ref()
                .and_then(|hand| hand.handedness)
                .map(|h| h.as_str().to_string()),
        }
    }

    pub fn into_frame(self) -> Result<LandmarkFrame> {
        if !self.timestamp.is_finite() {
            return Err(GhostHandError::MalformedFrame("timestamp is not finite".to_string()));
        }
        let handedness = self.handedness.as_deref().and_then(Handedness::from_label);
        let hand = match self.landmarks {
            Some(points) => Some(HandObservation::from_points(&points, handedness)?),
            None => None,
        };
        Ok(LandmarkFrame {
            timestamp: self.timestamp,
            hand,
        })
    }
}

/// Replays a JSON Lines recording.
pub struct ReplaySource<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> LandmarkSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let frame = serde_json::from_str::<RecordedFrame>(trimmed)
                .map_err(GhostHandError::from)
                .and_then(RecordedFrame::into_frame)
                .map_err(|e| GhostHandError::Replay {
                    line: self.line_number,
                    reason: e.to_string(),
                })?;
            return Ok(Some(frame));
        }
        Ok(None)
    }
}

/// In-memory frames, mainly for tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<LandmarkFrame>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: LandmarkFrame) {
        self.frames.push_back(frame);
    }
}

impl LandmarkSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        Ok(self.frames.pop_front())
    }
}
