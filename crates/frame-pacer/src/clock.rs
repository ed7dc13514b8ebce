//! Host clock abstraction.
//!
//! The pacer works in ticks of a monotonic counter truncated to 32 bits, the
//! width all deadline arithmetic wraps at. [`HostClock`] derives the counter
//! from `std::time::Instant` at a nominal 10 MHz, so it wraps roughly every
//! seven minutes and the rollover path is exercised in ordinary runs.

use std::time::{Duration, Instant};

/// Monotonic tick source plus the host's coarse sleep primitive.
///
/// `now` returns the low-order 32 bits of the counter. A `frequency` of zero
/// marks the source unusable; callers probe for that once via the pacer, it
/// is not re-checked per read.
pub trait ClockSource {
    /// Current counter value, low-order 32 bits.
    fn now(&self) -> u32;

    /// Counter ticks per second.
    fn frequency(&self) -> u32;

    /// Yield the processor for at least `millis` milliseconds.
    fn sleep(&self, millis: u64);
}

/// Tick rate of [`HostClock`]: 10 MHz, one tick per 100 ns.
pub const HOST_TICK_HZ: u32 = 10_000_000;

/// `Instant`-backed clock source.
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for HostClock {
    fn now(&self) -> u32 {
        (self.origin.elapsed().as_nanos() / 100) as u32
    }

    fn frequency(&self) -> u32 {
        HOST_TICK_HZ
    }

    fn sleep(&self, millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }
}
