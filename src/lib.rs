// src/lib.rs
//! Turns per-frame hand landmarks into pointer intents: wake, sleep, click,
//! cursor move and scroll, plus a smoothed cursor position.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod gesture;
pub mod hand;
pub mod input;
pub mod mediapipe_bridge;
pub mod smoothing;

pub use app::{Session, SessionSettings, TickReport};
pub use error::{GhostHandError, Result};
pub use features::HandFeatures;
pub use gesture::{GestureAction, GestureConfig, GestureEngine, GestureState};
pub use hand::{HandObservation, Handedness};
pub use smoothing::AdaptiveFilter;
