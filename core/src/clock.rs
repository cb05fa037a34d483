use core::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source sampled by every timer in the engine (combo window,
/// power-up durations, elapsed play time, notification windows).
///
/// The epoch is arbitrary; only differences between samples are meaningful.
pub trait GameClock {
    fn now(&self) -> Duration;
}

/// Production clock backed by `Instant`.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl GameClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Shared manually-driven clock for tests and replays. Clones observe the
/// same time; `Rc<Cell<_>>` is fine because the engine is single-threaded by
/// construction.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, to: Duration) {
        self.0.set(to);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl GameClock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}
