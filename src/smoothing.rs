// src/smoothing.rs - Velocity-adaptive low-pass filter for the cursor point
use std::f64::consts::PI;

pub const DEFAULT_MIN_CUTOFF: f64 = 0.1;
pub const DEFAULT_BETA: f64 = 0.5;

/// Exponential smoother, lazily seeded by its first sample.
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    last_value: Option<f64>,
}

impl LowPassFilter {
    pub fn new() -> Self {
        Self { last_value: None }
    }

    pub fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let smoothed = match self.last_value {
            Some(last) => alpha * value + (1.0 - alpha) * last,
            None => value,
        };
        self.last_value = Some(smoothed);
        smoothed
    }

    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    pub fn reset(&mut self) {
        self.last_value = None;
    }
}

/// Per-sample blend factor for a cutoff frequency (Hz) and sample period (s).
pub fn smoothing_factor(cutoff: f64, dt: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / dt)
}

/// Two-axis filter in the One Euro style. Both axes share one cutoff driven
/// by the combined speed `|dx/dt| + |dy/dt|`, so diagonal motion is smoothed
/// the same way as axis-aligned motion.
#[derive(Debug, Clone)]
pub struct AdaptiveFilter {
    min_cutoff: f64,
    beta: f64,
    /// `None` feeds the raw combined speed straight into the cutoff.
    d_cutoff: Option<f64>,
    x_filter: LowPassFilter,
    y_filter: LowPassFilter,
    speed_filter: LowPassFilter,
    last_time: Option<f64>,
}

impl AdaptiveFilter {
    /// `min_cutoff` and `beta` must be positive; the config layer
    /// guarantees this.
    pub fn new(min_cutoff: f64, beta: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff: None,
            x_filter: LowPassFilter::new(),
            y_filter: LowPassFilter::new(),
            speed_filter: LowPassFilter::new(),
            last_time: None,
        }
    }

    /// Also low-pass the speed estimate at `d_cutoff` Hz before it sets the
    /// cutoff, as in the textbook One Euro filter.
    pub fn with_derivative_cutoff(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        Self {
            d_cutoff: Some(d_cutoff),
            ..Self::new(min_cutoff, beta)
        }
    }

    /// `timestamp` is in seconds on any monotonic base.
    pub fn filter(&mut self, x: f64, y: f64, timestamp: f64) -> (f64, f64) {
        let (Some(last_time), Some(prev_x), Some(prev_y)) =
            (self.last_time, self.x_filter.last_value(), self.y_filter.last_value())
        else {
            // First sample passes through unchanged
            self.last_time = Some(timestamp);
            return (self.x_filter.filter(x, 1.0), self.y_filter.filter(y, 1.0));
        };

        let dt = timestamp - last_time;
        if dt <= 0.0 {
            return (prev_x, prev_y);
        }
        self.last_time = Some(timestamp);

        let dx = (x - prev_x) / dt;
        let dy = (y - prev_y) / dt;

        let speed_alpha = self.d_cutoff.map_or(1.0, |c| smoothing_factor(c, dt));
        let speed = self.speed_filter.filter(dx.abs() + dy.abs(), speed_alpha);

        let cutoff = self.min_cutoff + self.beta * speed.abs();
        let alpha = smoothing_factor(cutoff, dt);

        (self.x_filter.filter(x, alpha), self.y_filter.filter(y, alpha))
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((self.x_filter.last_value()?, self.y_filter.last_value()?))
    }

    pub fn reset(&mut self) {
        self.x_filter.reset();
        self.y_filter.reset();
        self.speed_filter.reset();
        self.last_time = None;
    }
}

impl Default for AdaptiveFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CUTOFF, DEFAULT_BETA)
    }
}
