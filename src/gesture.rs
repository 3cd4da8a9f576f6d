// src/gesture.rs - Gesture classification state machine (wake/sleep, click, scroll)
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::features::{HandFeatures, DEFAULT_CLICK_THRESHOLD};
use crate::hand::HandObservation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GestureState {
    Sleep,
    /// Hand visible but not in a control pose.
    Idle,
    /// Clutch engaged: strictly the index finger up.
    Tracking,
    /// One-tick marker after a click fired.
    ClickPending,
    Scrolling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GestureAction {
    None,
    Click,
    Wake,
    Sleep,
    Scroll,
}

impl GestureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "SLEEP",
            Self::Idle => "IDLE",
            Self::Tracking => "TRACKING",
            Self::ClickPending => "CLICK_PENDING",
            Self::Scrolling => "SCROLLING",
        }
    }
}

impl GestureAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Click => "CLICK",
            Self::Wake => "WAKE",
            Self::Sleep => "SLEEP",
            Self::Scroll => "SCROLL",
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GestureAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GestureConfig {
    pub click_threshold: f64,
    pub history_size: usize,
    pub hold_time_required: Duration,
    pub hold_stability_threshold: f64,
    pub wave_cooldown: Duration,
    pub wave_movement_threshold: f64,
    /// Wrist x below this or above `1 - edge_margin` marks a full-frame swipe.
    pub edge_margin: f64,
    pub wake_fingers_required: usize,
    pub wave_fingers_required: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            history_size: 20,
            hold_time_required: Duration::from_secs_f64(1.0),
            hold_stability_threshold: 0.05,
            wave_cooldown: Duration::from_secs_f64(2.0),
            wave_movement_threshold: 0.15,
            edge_margin: 0.1,
            wake_fingers_required: 4,
            wave_fingers_required: 3,
        }
    }
}

/// Fixed-capacity FIFO of recent wrist x positions.
#[derive(Debug, Clone)]
pub struct WristHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl WristHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, x: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(x);
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// (min, max) of the buffered samples.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }

    pub fn range(&self) -> Option<f64> {
        self.bounds().map(|(lo, hi)| hi - lo)
    }
}

pub struct GestureEngine {
    config: GestureConfig,
    current_state: GestureState,
    wrist_history: WristHistory,
    hold_start_time: Option<Instant>,
    last_toggle_time: Option<Instant>,
    was_thumb_closed: bool,
}

impl GestureEngine {
    /// Sessions start asleep.
    pub fn new(config: GestureConfig) -> Self {
        let wrist_history = WristHistory::new(config.history_size);
        Self {
            config,
            current_state: GestureState::Sleep,
            wrist_history,
            hold_start_time: None,
            last_toggle_time: None,
            was_thumb_closed: false,
        }
    }

    pub fn state(&self) -> GestureState {
        self.current_state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn history(&self) -> &WristHistory {
        &self.wrist_history
    }

    pub fn is_hold_pending(&self) -> bool {
        self.hold_start_time.is_some()
    }

    /// Expects a value already validated against (0.05, 1.0].
    pub fn set_click_threshold(&mut self, threshold: f64) {
        self.config.click_threshold = threshold;
    }

    /// Overrides the state without touching history or cooldown. Used for
    /// manual wake and keep-awake.
    pub fn force_state(&mut self, state: GestureState) {
        self.current_state = state;
    }

    pub fn process(&mut self, observation: Option<&HandObservation>) -> (GestureState, GestureAction) {
        self.process_at(observation, Instant::now())
    }

    pub fn process_at(
        &mut self,
        observation: Option<&HandObservation>,
        now: Instant,
    ) -> (GestureState, GestureAction) {
        // Lost hand: drop the hold countdown, nothing else changes
        let Some(obs) = observation else {
            self.hold_start_time = None;
            return (self.current_state, GestureAction::None);
        };

        let features = HandFeatures::extract(obs, self.config.click_threshold);

        // Hold to wake, only while asleep
        if self.current_state == GestureState::Sleep {
            self.wrist_history.push(features.wrist_x);

            if features.is_palm_facing && self.detect_hold_to_wake(&features, now) {
                info!("Hold-to-wake detected");
                self.last_toggle_time = Some(now);
                self.current_state = GestureState::Idle;
                self.wrist_history.clear();
                return (self.current_state, GestureAction::Wake);
            }
        }

        // Wave toggles in either direction
        self.wrist_history.push(features.wrist_x);
        if self.cooldown_elapsed(now)
            && features.fingers_open_count >= self.config.wave_fingers_required
            && features.is_palm_facing
            && self.detect_wave()
        {
            self.last_toggle_time = Some(now);

            if self.current_state == GestureState::Sleep {
                info!("Wave detected, waking up");
                self.current_state = GestureState::Idle;
                return (self.current_state, GestureAction::Wake);
            }

            info!("Wave detected, going to sleep");
            self.current_state = GestureState::Sleep;
            return (self.current_state, GestureAction::Sleep);
        }

        if self.current_state == GestureState::Sleep {
            return (GestureState::Sleep, GestureAction::None);
        }

        let (new_state, action) = if features.is_tracking_pose() {
            if self.was_thumb_closed && !features.is_thumb_closed {
                info!(
                    "Click triggered, ratio {:.3} (threshold {})",
                    features.click_ratio, self.config.click_threshold
                );
                (GestureState::ClickPending, GestureAction::Click)
            } else {
                (GestureState::Tracking, GestureAction::None)
            }
        } else if features.is_scroll_pose() {
            (GestureState::Scrolling, GestureAction::Scroll)
        } else {
            (GestureState::Idle, GestureAction::None)
        };

        self.was_thumb_closed = features.is_thumb_closed;
        self.current_state = new_state;

        (new_state, action)
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_toggle_time {
            Some(last) => now.saturating_duration_since(last) > self.config.wave_cooldown,
            None => true,
        }
    }

    fn detect_hold_to_wake(&mut self, features: &HandFeatures, now: Instant) -> bool {
        if features.fingers_open_count < self.config.wake_fingers_required {
            self.hold_start_time = None;
            return false;
        }

        if !self.wrist_history.is_full() {
            return false;
        }

        let Some(range) = self.wrist_history.range() else {
            return false;
        };

        if range >= self.config.hold_stability_threshold {
            // Moving, the countdown restarts
            self.hold_start_time = None;
            return false;
        }

        match self.hold_start_time {
            None => {
                debug!("Hold started (range {:.3})", range);
                self.hold_start_time = Some(now);
                false
            }
            Some(start) if now.saturating_duration_since(start) > self.config.hold_time_required => {
                self.hold_start_time = None;
                true
            }
            Some(_) => false,
        }
    }

    fn detect_wave(&self) -> bool {
        if !self.wrist_history.is_full() {
            return false;
        }

        let Some((x_min, x_max)) = self.wrist_history.bounds() else {
            return false;
        };

        // Touching a frame edge means a swipe across, not a wave
        if x_min < self.config.edge_margin || x_max > 1.0 - self.config.edge_margin {
            debug!("Wave rejected at frame edge ({:.3}..{:.3})", x_min, x_max);
            return false;
        }

        x_max - x_min > self.config.wave_movement_threshold
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
