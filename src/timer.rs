//! Frame timers driven by an external clock.
//!
//! Every timer is advanced with `update(now)`, where `now` is the monotonic
//! "seconds since start" value read once at the top of a frame. Timers never
//! read a clock themselves, which keeps animation deterministic under test.
//!
//! - [`BasicTimer`] accumulates scaled elapsed time.
//! - [`IntervalTimer`] loops inside `[t_min, t_max)`.
//! - [`ReversingTimer`] bounces back and forth inside `[t_min, t_max]`.
//! - [`EventTimer`] raises a flag once per period.

use std::cmp::Ordering;

use crate::error::{Result, RigError};

fn check_interval(t_min: f32, t_max: f32) -> Result<()> {
    // NaN bounds compare as unordered and are rejected too.
    if t_min.partial_cmp(&t_max) != Some(Ordering::Less) {
        return Err(RigError::InvalidInterval {
            min: t_min,
            max: t_max,
        });
    }
    Ok(())
}

/// Accumulates `scale * elapsed` into `t` while running.
///
/// The first update after construction or [`start`](Self::start) only
/// records the clock and reports a zero delta.
#[derive(Clone, Debug)]
pub struct BasicTimer {
    /// Accumulated time.
    pub t: f32,
    /// Speed multiplier applied to elapsed clock time.
    pub scale: f32,
    running: bool,
    time_previous: Option<f32>,
}

impl Default for BasicTimer {
    fn default() -> Self {
        Self {
            t: 0.0,
            scale: 1.0,
            running: true,
            time_previous: None,
        }
    }
}

impl BasicTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the timer to `now` and returns the scaled delta.
    pub fn update(&mut self, now: f32) -> f32 {
        if !self.running {
            return 0.0;
        }
        let dt = match self.time_previous {
            Some(previous) => self.scale * (now - previous),
            None => 0.0,
        };
        self.time_previous = Some(now);
        self.t += dt;
        dt
    }

    /// Resumes the timer; elapsed time is counted from `now`.
    pub fn start(&mut self, now: f32) {
        self.running = true;
        self.time_previous = Some(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Loops `t` inside `[t_min, t_max)`.
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    base: BasicTimer,
    t_min: f32,
    t_max: f32,
}

impl IntervalTimer {
    /// Starts at `t_min`. Fails unless `t_min < t_max`.
    pub fn new(t_min: f32, t_max: f32) -> Result<Self> {
        check_interval(t_min, t_max)?;
        Ok(Self {
            base: BasicTimer {
                t: t_min,
                ..BasicTimer::default()
            },
            t_min,
            t_max,
        })
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.base.scale = scale;
        self
    }

    /// Advances and wraps in both directions. A delta wider than the interval
    /// is reported as 0.
    pub fn update(&mut self, now: f32) -> f32 {
        let mut dt = self.base.update(now);
        let width = self.t_max - self.t_min;
        if dt.abs() > width {
            dt = 0.0;
        }

        let window = self.t_min..self.t_max;
        if !window.contains(&self.base.t) {
            let wrapped = self.t_min + (self.base.t - self.t_min).rem_euclid(width);
            // Rounding can land exactly on t_max; a NaN clock restarts the loop.
            self.base.t = if window.contains(&wrapped) {
                wrapped
            } else {
                self.t_min
            };
        }
        dt
    }

    pub fn t(&self) -> f32 {
        self.base.t
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.t_min, self.t_max)
    }

    pub fn start(&mut self, now: f32) {
        self.base.start(now);
    }

    pub fn stop(&mut self) {
        self.base.stop();
    }
}

/// Moves `t` forward to `t_max`, then backward to `t_min`, and so on.
#[derive(Clone, Debug)]
pub struct ReversingTimer {
    base: BasicTimer,
    t_min: f32,
    t_max: f32,
    forward: bool,
}

impl ReversingTimer {
    pub fn new(t_min: f32, t_max: f32) -> Result<Self> {
        check_interval(t_min, t_max)?;
        Ok(Self {
            base: BasicTimer {
                t: t_min,
                ..BasicTimer::default()
            },
            t_min,
            t_max,
            forward: true,
        })
    }

    pub fn update(&mut self, now: f32) -> f32 {
        let previous_t = self.base.t;
        let dt = self.base.update(now);
        let direction = if self.forward { 1.0 } else { -1.0 };
        let mut t = previous_t + direction * dt;

        if t >= self.t_max {
            t = 2.0 * self.t_max - t;
            self.forward = false;
        } else if t < self.t_min {
            t = 2.0 * self.t_min - t;
            self.forward = true;
        }
        self.base.t = t.clamp(self.t_min, self.t_max);
        dt
    }

    pub fn t(&self) -> f32 {
        self.base.t
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }
}

/// Raises [`fired`](Self::fired) once every `period` seconds of timer time.
#[derive(Clone, Debug)]
pub struct EventTimer {
    base: BasicTimer,
    /// Time between two events.
    pub period: f32,
    since_last_event: f32,
    event: bool,
}

impl EventTimer {
    pub fn new(period: f32) -> Self {
        Self {
            base: BasicTimer::default(),
            period,
            since_last_event: 0.0,
            event: false,
        }
    }

    pub fn update(&mut self, now: f32) -> f32 {
        let dt = self.base.update(now);
        self.since_last_event += dt;
        if self.since_last_event > self.period {
            self.event = true;
            self.since_last_event = 0.0;
        } else {
            self.event = false;
        }
        dt
    }

    /// Whether the last update crossed the period.
    pub fn fired(&self) -> bool {
        self.event
    }

    pub fn t(&self) -> f32 {
        self.base.t
    }
}
