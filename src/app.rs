// src/app.rs - Per-tick session loop: gestures + smoothing -> device commands
use std::time::{Duration, Instant};

use nalgebra::Vector2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{is_valid_click_threshold, Profile};
use crate::error::Result;
use crate::gesture::{GestureAction, GestureConfig, GestureEngine, GestureState};
use crate::input::{DeviceCommand, InputSink, Sensitivity};
use crate::mediapipe_bridge::{LandmarkFrame, LandmarkSource};
use crate::smoothing::AdaptiveFilter;

/// Vertical movement below this is ignored while scrolling.
pub const SCROLL_DEADZONE: f64 = 0.002;
/// Wheel steps per unit of normalised vertical movement.
pub const SCROLL_GAIN: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub sensitivity: Sensitivity,
    /// Blocks every transition into sleep.
    pub keep_awake: bool,
    pub invert_scroll: bool,
    pub min_cutoff: f64,
    pub beta: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_profile(&Profile::default())
    }
}

impl SessionSettings {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            sensitivity: profile.sensitivity(),
            keep_awake: profile.keep_awake,
            invert_scroll: profile.invert_scroll,
            min_cutoff: profile.min_cutoff,
            beta: profile.beta,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayStatus {
    pub is_tracking: bool,
    pub is_sleep: bool,
    pub is_scrolling: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub timestamp: f64,
    pub state: GestureState,
    pub action: GestureAction,
    /// Raw index-tip position, when a hand was seen.
    pub raw_cursor: Option<(f64, f64)>,
    pub cursor: Option<(f64, f64)>,
    pub commands: Vec<DeviceCommand>,
    pub overlay: OverlayStatus,
}

/// Updates queued from another context, applied at the top of the next tick.
#[derive(Debug, Default)]
struct PendingUpdates {
    click_threshold: Option<f64>,
    settings: Option<SessionSettings>,
    wake: bool,
}

pub struct Session {
    engine: GestureEngine,
    filter: AdaptiveFilter,
    settings: SessionSettings,
    pending: PendingUpdates,
    prev_point: Option<Vector2<f64>>,
}

impl Session {
    pub fn new(settings: SessionSettings, gesture_config: GestureConfig) -> Self {
        Self {
            engine: GestureEngine::new(gesture_config),
            filter: AdaptiveFilter::new(settings.min_cutoff, settings.beta),
            settings,
            pending: PendingUpdates::default(),
            prev_point: None,
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        let gesture_config = GestureConfig {
            click_threshold: profile.click_threshold,
            ..GestureConfig::default()
        };
        Self::new(SessionSettings::from_profile(profile), gesture_config)
    }

    pub fn state(&self) -> GestureState {
        self.engine.state()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    /// Rejects values outside (0.05, 1.0]; otherwise applies on the next tick.
    pub fn set_click_threshold(&mut self, threshold: f64) -> bool {
        if !is_valid_click_threshold(threshold) {
            warn!("Ignoring click threshold {} outside (0.05, 1.0]", threshold);
            return false;
        }
        self.pending.click_threshold = Some(threshold);
        true
    }

    pub fn update_settings(&mut self, settings: SessionSettings) {
        self.pending.settings = Some(settings);
    }

    pub fn request_wake(&mut self) {
        self.pending.wake = true;
    }

    fn apply_pending(&mut self) {
        if let Some(threshold) = self.pending.click_threshold.take() {
            debug!("Click threshold -> {}", threshold);
            self.engine.set_click_threshold(threshold);
        }
        if let Some(settings) = self.pending.settings.take() {
            if settings.min_cutoff != self.settings.min_cutoff || settings.beta != self.settings.beta {
                self.filter = AdaptiveFilter::new(settings.min_cutoff, settings.beta);
                self.prev_point = None;
            }
            self.settings = settings;
        }
        if std::mem::take(&mut self.pending.wake) {
            info!("Manual wake up");
            self.engine.force_state(GestureState::Idle);
        }
    }

    /// Runs one tick. `now` drives gesture timing, `frame.timestamp` drives
    /// the filter.
    pub fn tick(&mut self, frame: &LandmarkFrame, now: Instant) -> TickReport {
        self.apply_pending();

        let (mut state, mut action) = self.engine.process_at(frame.hand.as_ref(), now);

        if self.settings.keep_awake {
            if action == GestureAction::Sleep {
                info!("Sleep blocked by keep-awake");
                action = GestureAction::None;
            }
            if state == GestureState::Sleep {
                self.engine.force_state(GestureState::Idle);
                state = GestureState::Idle;
            }
        } else if action == GestureAction::Sleep {
            info!("Going to sleep");
        }
        if action == GestureAction::Wake {
            info!("Wake up");
        }

        let mut report = TickReport {
            timestamp: frame.timestamp,
            state,
            action,
            raw_cursor: None,
            cursor: None,
            commands: Vec::new(),
            overlay: OverlayStatus {
                is_sleep: state == GestureState::Sleep,
                ..OverlayStatus::default()
            },
        };

        let Some(hand) = frame.hand.as_ref() else {
            // Reacquiring a hand starts over with a zero delta
            self.prev_point = None;
            self.filter.reset();
            return report;
        };

        let raw = hand.cursor_source();
        let (sx, sy) = self.filter.filter(raw.x, raw.y, frame.timestamp);
        let current = Vector2::new(sx, sy);
        let prev = self.prev_point.unwrap_or(current);
        let delta = current - prev;

        report.raw_cursor = Some((raw.x, raw.y));
        report.cursor = Some((sx, sy));

        match state {
            GestureState::Tracking | GestureState::ClickPending => {
                report.overlay.is_tracking = true;
                report.commands.push(DeviceCommand::MoveCursor {
                    dx: delta.x,
                    dy: delta.y,
                });
            }
            GestureState::Scrolling => {
                report.overlay.is_scrolling = true;
                if let Some(steps) = scroll_steps(delta.y, self.settings.invert_scroll) {
                    report.commands.push(DeviceCommand::Scroll { steps });
                }
            }
            GestureState::Idle | GestureState::Sleep => {}
        }

        if action == GestureAction::Click {
            report.commands.push(DeviceCommand::Click);
        }

        self.prev_point = Some(current);
        report
    }

    /// Ticks and forwards the resulting commands to `sink`.
    pub fn tick_into(
        &mut self,
        frame: &LandmarkFrame,
        now: Instant,
        sink: &mut dyn InputSink,
    ) -> Result<TickReport> {
        let report = self.tick(frame, now);
        for command in &report.commands {
            sink.dispatch(command, &self.settings.sensitivity)?;
        }
        Ok(report)
    }

    /// Drains `source`, mapping each recorded timestamp onto a clock that
    /// starts at the first frame.
    pub fn run(
        &mut self,
        source: &mut dyn LandmarkSource,
        sink: &mut dyn InputSink,
    ) -> Result<Vec<TickReport>> {
        let start = Instant::now();
        let mut origin: Option<f64> = None;
        let mut reports = Vec::new();

        while let Some(frame) = source.next_frame()? {
            let base = *origin.get_or_insert(frame.timestamp);
            // Out-of-range offsets fall back to the first frame's instant
            let offset = Duration::try_from_secs_f64(frame.timestamp - base).unwrap_or_default();
            let now = start + offset;
            reports.push(self.tick_into(&frame, now, sink)?);
        }

        info!("Replayed {} frames", reports.len());
        Ok(reports)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default(), GestureConfig::default())
    }
}

/// Hand moving down scrolls down unless inverted.
pub fn scroll_steps(dy: f64, invert: bool) -> Option<f64> {
    if dy.abs() <= SCROLL_DEADZONE {
        return None;
    }
    let mut direction = if dy > 0.0 { -1.0 } else { 1.0 };
    if invert {
        direction = -direction;
    }
    Some(direction * dy.abs() * SCROLL_GAIN)
}
