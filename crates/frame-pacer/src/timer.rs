//! Deadline bookkeeping for the frame pacer.

use crate::clock::ClockSource;

/// Sleep slice for the coarse portion of a wait, in milliseconds.
pub const SLEEP_SLICE_MS: u64 = 3;

/// Calibration results and per-cycle deadline state.
///
/// Owned and mutated only by the pacing thread. All deadline arithmetic
/// wraps at the 32-bit counter width.
#[derive(Debug, Default)]
pub struct TimerState {
    /// Clock ticks per frame period. Positive after calibration.
    pub(crate) ticks_per_frame: u32,
    /// Counter value at which the next frame should begin.
    pub(crate) next_deadline: u32,
    /// Set when the deadline wrapped past the counter maximum relative to
    /// the previous one; cleared once the pacer has ridden out the wrap.
    pub(crate) rollover_pending: bool,
    /// Remaining slack below which the pacer spins instead of sleeping.
    pub(crate) sleep_threshold: i32,
}

impl TimerState {
    /// Derive `ticks_per_frame` and the sleep threshold from the counter
    /// frequency and the target refresh rate, then start the first cycle.
    ///
    /// Must be re-run whenever the standard or the clock frequency changes.
    /// A zero target rate is substituted with 1: degenerate but defined.
    pub fn calibrate(&mut self, clock: &impl ClockSource, target_hz: u32) {
        let frequency = clock.frequency();
        self.ticks_per_frame = frequency / if target_hz == 0 { 1 } else { target_hz };
        // One sleep slice plus a unit of margin, in ticks
        self.sleep_threshold = (u64::from(frequency) * (SLEEP_SLICE_MS + 1) / 1000) as i32;
        self.start_cycle(clock, false);
    }

    /// Capture a new deadline one frame period from now.
    ///
    /// With `check_rollover`, flags whether the new deadline wrapped
    /// relative to the previous one. The first cycle after calibration has
    /// no prior deadline to compare, so it skips the check.
    pub fn start_cycle(&mut self, clock: &impl ClockSource, check_rollover: bool) {
        let previous = self.next_deadline;
        self.next_deadline = clock.now().wrapping_add(self.ticks_per_frame);
        if check_rollover {
            self.rollover_pending = previous > self.next_deadline;
        }
    }

    #[must_use]
    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    #[must_use]
    pub fn next_deadline(&self) -> u32 {
        self.next_deadline
    }

    #[must_use]
    pub fn rollover_pending(&self) -> bool {
        self.rollover_pending
    }

    #[must_use]
    pub fn sleep_threshold(&self) -> i32 {
        self.sleep_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimClock;

    #[test]
    fn calibration_divides_frequency_by_target() {
        let clock = SimClock::new(10_000_000);
        let mut timer = TimerState::default();
        timer.calibrate(&clock, 50);
        assert_eq!(timer.ticks_per_frame, 200_000);
        // 10 MHz * (3 + 1) / 1000
        assert_eq!(timer.sleep_threshold, 40_000);
    }

    #[test]
    fn calibration_survives_zero_target_rate() {
        let clock = SimClock::new(10_000_000);
        let mut timer = TimerState::default();
        timer.calibrate(&clock, 0);
        assert_eq!(timer.ticks_per_frame, 10_000_000);
    }

    #[test]
    fn calibration_starts_a_cycle() {
        let clock = SimClock::new(10_000_000);
        clock.set_now(1_000);
        let mut timer = TimerState::default();
        timer.calibrate(&clock, 50);
        assert_eq!(timer.next_deadline, 201_000);
        assert!(!timer.rollover_pending);
    }

    #[test]
    fn cycle_start_flags_wrap() {
        let clock = SimClock::new(10_000_000);
        clock.set_now(0xFFFF_FFF0);
        let mut timer = TimerState {
            ticks_per_frame: 0x20,
            next_deadline: 0xFFFF_FFF0,
            ..TimerState::default()
        };
        timer.start_cycle(&clock, true);
        assert_eq!(timer.next_deadline, 0x10);
        assert!(timer.rollover_pending);
    }

    #[test]
    fn cycle_start_without_check_leaves_flag_alone() {
        let clock = SimClock::new(10_000_000);
        clock.set_now(0xFFFF_FFF0);
        let mut timer = TimerState {
            ticks_per_frame: 0x20,
            next_deadline: 0xFFFF_FFF0,
            ..TimerState::default()
        };
        timer.start_cycle(&clock, false);
        assert_eq!(timer.next_deadline, 0x10);
        assert!(!timer.rollover_pending);
    }
}
