//! Simulation time model.
//!
//! # Design
//!
//! Time is a pure `f64` simulation value with no wall-clock coupling.  Every
//! scheduled action carries an [`Event`]: the time it fires, the period used
//! to reschedule it, and a priority that breaks ties between events firing at
//! the same instant.
//!
//! # Ordering
//!
//! ```text
//! a < b  ⇔  a.time < b.time
//!        ∨ (a.time == b.time ∧ a.priority < b.priority)
//! ```
//!
//! Lower numeric priority runs first.  `period` takes part only as a final
//! tie-break so that `Eq` agrees with `Ord`; it never reorders events whose
//! `(time, priority)` differ.  Times are compared with `f64::total_cmp`, so
//! the order is total even in the presence of infinities.

use std::cmp::Ordering;
use std::fmt;

// ── Event ─────────────────────────────────────────────────────────────────────

/// The `(time, period, priority)` scheduling key used by every queue in the
/// kernel.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    time:     f64,
    period:   f64,
    priority: i32,
}

impl Event {
    /// Default rescheduling period.
    pub const DEFAULT_PERIOD: f64 = 1.0;

    /// An event at `time` that repeats every `period` with `priority`.
    #[inline]
    pub fn new(time: f64, period: f64, priority: i32) -> Self {
        Self { time, period, priority }
    }

    /// An event at `time` with period 1 and priority 0.
    #[inline]
    pub fn at(time: f64) -> Self {
        Self::new(time, Self::DEFAULT_PERIOD, 0)
    }

    /// The sentinel returned by empty queues.  Sorts after every real event.
    #[inline]
    pub fn never() -> Self {
        Self::new(f64::INFINITY, 0.0, i32::MAX)
    }

    /// `true` for the [`Event::never`] sentinel (any event at `+inf`).
    #[inline]
    pub fn is_never(&self) -> bool {
        self.time == f64::INFINITY
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn set_period(&mut self, period: f64) {
        self.period = period;
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// The same event moved one period past `clock`.
    #[inline]
    pub fn rescheduled_from(self, clock: f64) -> Self {
        Self { time: clock + self.period, ..self }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::at(0.0)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.priority.cmp(&other.priority))
            .then(self.period.total_cmp(&other.period))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} (period {}, priority {})", self.time, self.period, self.priority)
    }
}
