// src/input.rs - Device commands and the sinks that consume them
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// One wheel notch.
pub const WHEEL_DELTA: f64 = 120.0;

/// Device-level commands with normalised magnitudes; sinks scale them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DeviceCommand {
    MoveCursor { dx: f64, dy: f64 },
    Click,
    /// Positive scrolls up (away from the user).
    Scroll { steps: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub x: f64,
    pub y: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self { x: 1500.0, y: 1500.0 }
    }
}

/// Pixel delta for a normalised move, or `None` when it rounds to nothing.
pub fn pixel_delta(dx: f64, dy: f64, sensitivity: &Sensitivity) -> Option<(i32, i32)> {
    let px = (dx * sensitivity.x).trunc() as i32;
    let py = (dy * sensitivity.y).trunc() as i32;
    if px == 0 && py == 0 {
        None
    } else {
        Some((px, py))
    }
}

pub fn wheel_amount(steps: f64) -> i32 {
    (steps * WHEEL_DELTA).trunc() as i32
}

pub trait InputSink {
    fn dispatch(&mut self, command: &DeviceCommand, sensitivity: &Sensitivity) -> Result<()>;
}

/// Logs what an OS injection backend would receive.
#[derive(Debug, Default)]
pub struct LogSink {
    dispatched: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

impl InputSink for LogSink {
    fn dispatch(&mut self, command: &DeviceCommand, sensitivity: &Sensitivity) -> Result<()> {
        match *command {
            DeviceCommand::MoveCursor { dx, dy } => {
                let Some((px, py)) = pixel_delta(dx, dy, sensitivity) else {
                    return Ok(());
                };
                debug!("move cursor {:+} {:+}", px, py);
            }
            DeviceCommand::Click => info!("left click"),
            DeviceCommand::Scroll { steps } => debug!("scroll wheel {:+}", wheel_amount(steps)),
        }
        self.dispatched += 1;
        Ok(())
    }
}

/// Keeps every command it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub commands: Vec<DeviceCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Click))
            .count()
    }
}

impl InputSink for RecordingSink {
    fn dispatch(&mut self, command: &DeviceCommand, _sensitivity: &Sensitivity) -> Result<()> {
        self.commands.push(*command);
        Ok(())
    }
}
