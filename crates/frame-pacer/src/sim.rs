//! Deterministic clock for tests and headless experiments.

use std::cell::Cell;

use crate::clock::ClockSource;

/// Simulated counter implementing [`ClockSource`].
///
/// Each `now` call returns the current counter and then advances it by a
/// fixed read cost, so busy-wait loops make progress; `sleep` advances the
/// counter by the equivalent tick count and is tallied. Single-threaded by
/// design, like the pacer state it drives.
pub struct SimClock {
    ticks: Cell<u32>,
    frequency: u32,
    read_cost: u32,
    sleeps: Cell<u32>,
}

impl SimClock {
    /// Clock at `frequency` Hz with a read cost of 100 ticks.
    #[must_use]
    pub fn new(frequency: u32) -> Self {
        Self::with_read_cost(frequency, 100)
    }

    /// The read cost must be positive or spin loops never advance.
    #[must_use]
    pub fn with_read_cost(frequency: u32, read_cost: u32) -> Self {
        Self {
            ticks: Cell::new(0),
            frequency,
            read_cost,
            sleeps: Cell::new(0),
        }
    }

    /// Jump the counter to an absolute value.
    pub fn set_now(&self, ticks: u32) {
        self.ticks.set(ticks);
    }

    /// Number of `sleep` calls observed.
    #[must_use]
    pub fn sleep_count(&self) -> u32 {
        self.sleeps.get()
    }
}

impl ClockSource for SimClock {
    fn now(&self) -> u32 {
        let ticks = self.ticks.get();
        self.ticks.set(ticks.wrapping_add(self.read_cost));
        ticks
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn sleep(&self, millis: u64) {
        self.sleeps.set(self.sleeps.get() + 1);
        let ticks = (millis * u64::from(self.frequency) / 1000) as u32;
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }
}
