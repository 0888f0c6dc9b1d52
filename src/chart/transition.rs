//! Time-based interpolation of element attributes
//!
//! Time is a `Duration` measured from the start of the chart, passed in by the
//! caller. Nothing here reads a clock, so frames can be sampled at arbitrary
//! instants (tests sample them directly; the pipeline samples from tokio timers).
//!
//! Easing is linear: progress is the elapsed fraction of the duration.

use super::colors::interpolate_rgb;
use std::time::Duration;

/// A fixed-duration window of animation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    start: Duration,
    duration: Duration,
}

impl Transition {
    pub fn new(start: Duration, duration: Duration) -> Self {
        Self { start, duration }
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    /// Eased progress in [0, 1] at `now`
    pub fn progress(&self, now: Duration) -> f64 {
        if now < self.start {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        let raw = (now - self.start).as_secs_f64() / self.duration.as_secs_f64();
        ease_linear(raw.clamp(0.0, 1.0))
    }

    pub fn is_complete(&self, now: Duration) -> bool {
        now >= self.end()
    }
}

/// Linear easing: no acceleration
pub fn ease_linear(t: f64) -> f64 {
    t
}

/// Values that can be blended between two endpoints
pub trait Interpolate: Clone {
    /// Blend towards `to`; `t >= 1` must return `to` exactly
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if t >= 1.0 {
            return *to;
        }
        if t <= 0.0 {
            return *self;
        }
        self + (to - self) * t
    }
}

impl Interpolate for [u8; 3] {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        interpolate_rgb(*self, *to, t)
    }
}

/// Interpolate then round to the nearest integer
pub fn interpolate_round(from: f64, to: f64, t: f64) -> f64 {
    from.interpolate(&to, t).round()
}

/// One animated attribute
///
/// Retargeting starts the new interpolation from the previous *target*, never
/// from an in-flight intermediate value, so overlapping ticks cannot compound
/// partial states.
#[derive(Debug, Clone)]
pub struct Tween<T> {
    from: T,
    to: T,
    transition: Option<Transition>,
}

impl<T: Interpolate> Tween<T> {
    /// A value that is not animating
    pub fn at_rest(value: T) -> Self {
        Self {
            from: value.clone(),
            to: value,
            transition: None,
        }
    }

    /// Value at `now`
    pub fn value_at(&self, now: Duration) -> T {
        match self.transition {
            Some(t) => self.from.interpolate(&self.to, t.progress(now)),
            None => self.to.clone(),
        }
    }

    pub fn target(&self) -> &T {
        &self.to
    }

    /// Animate from the current target to `to`
    pub fn animate_to(&mut self, to: T, transition: Transition) {
        self.from = std::mem::replace(&mut self.to, to);
        self.transition = Some(transition);
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        self.transition.map_or(true, |t| t.is_complete(now))
    }
}

/// Numeric label whose text is re-rendered on every frame
///
/// The value is interpolated and rounded to the nearest integer before
/// formatting, which gives the counting effect on ranked values.
#[derive(Debug, Clone)]
pub struct LabelTween {
    from: f64,
    to: f64,
    transition: Option<Transition>,
    format: fn(f64) -> String,
}

impl LabelTween {
    pub fn at_rest(value: f64, format: fn(f64) -> String) -> Self {
        Self {
            from: value,
            to: value,
            transition: None,
            format,
        }
    }

    /// Count from `from` to `to` over `transition`
    pub fn count(&mut self, from: f64, to: f64, transition: Transition) {
        self.from = from;
        self.to = to;
        self.transition = Some(transition);
    }

    /// Count from the current target to `to`
    pub fn count_to(&mut self, to: f64, transition: Transition) {
        let from = self.to;
        self.count(from, to, transition);
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// Rounded value at `now`
    pub fn value_at(&self, now: Duration) -> f64 {
        match self.transition {
            Some(t) => interpolate_round(self.from, self.to, t.progress(now)),
            None => self.to.round(),
        }
    }

    pub fn text_at(&self, now: Duration) -> String {
        (self.format)(self.value_at(now))
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        self.transition.map_or(true, |t| t.is_complete(now))
    }
}

/// Issues the shared transition for each tick
///
/// Enter, update and exit groups of one tick all receive the same
/// `Transition`, so they start together and complete together.
#[derive(Debug, Clone)]
pub struct TransitionScheduler {
    duration: Duration,
    in_flight: Option<Transition>,
    issued: u64,
}

impl TransitionScheduler {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            in_flight: None,
            issued: 0,
        }
    }

    /// Start a new transition at `now`
    ///
    /// A transition still in flight is superseded; tweens retarget from their
    /// targets, so the new interpolation never starts from a stale midpoint.
    pub fn begin(&mut self, now: Duration) -> Transition {
        if let Some(previous) = self.in_flight {
            if !previous.is_complete(now) {
                tracing::debug!(
                    remaining_ms = (previous.end() - now).as_millis() as u64,
                    "superseding in-flight transition"
                );
            }
        }
        let transition = Transition::new(now, self.duration);
        self.in_flight = Some(transition);
        self.issued += 1;
        transition
    }

    /// True while the latest transition has not completed
    pub fn is_busy(&self, now: Duration) -> bool {
        self.in_flight.map_or(false, |t| !t.is_complete(now))
    }

    /// When the latest transition completes
    pub fn settles_at(&self) -> Option<Duration> {
        self.in_flight.map(|t| t.end())
    }

    /// Number of transitions issued so far
    pub fn issued(&self) -> u64 {
        self.issued
    }
}
