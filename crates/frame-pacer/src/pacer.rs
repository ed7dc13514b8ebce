//! The per-frame pacing loop.
//!
//! `wait_for_vbi` blocks until the next frame deadline using a hybrid
//! sleep/spin wait: sleep in 3 ms slices while the remaining slack exceeds
//! the calibrated threshold, then busy-poll the counter for precision finer
//! than the host sleep granularity. It then schedules the following deadline
//! and, when audio is active, performs the bounded fragment handoff.

use audio_fragments::FragmentProducer;

use crate::clock::ClockSource;
use crate::region::{RefreshRates, TvStandard};
use crate::timer::{SLEEP_SLICE_MS, TimerState};

/// Paces the emulation main loop to the selected refresh rate.
///
/// Not reentrant: one pacer paces exactly one frame loop.
/// [`examine`](Self::examine) must report a usable clock before
/// [`reset`](Self::reset) or [`wait_for_vbi`](Self::wait_for_vbi) are relied
/// on; that precondition is not re-checked at runtime.
pub struct VbiPacer<C: ClockSource> {
    clock: C,
    timer: TimerState,
    rates: RefreshRates,
    full_speed: bool,
}

impl<C: ClockSource> VbiPacer<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self::with_rates(clock, RefreshRates::default())
    }

    #[must_use]
    pub fn with_rates(clock: C, rates: RefreshRates) -> Self {
        Self {
            clock,
            timer: TimerState::default(),
            rates,
            full_speed: false,
        }
    }

    /// Capability probe: false when the clock source reports zero frequency.
    #[must_use]
    pub fn examine(&self) -> bool {
        self.clock.frequency() != 0
    }

    /// Recalibrate for the given standard and start a fresh cycle.
    pub fn reset(&mut self, standard: TvStandard) {
        self.timer
            .calibrate(&self.clock, self.rates.target_hz(standard));
        log::debug!(
            "calibrated for {standard:?}: {} ticks/frame, sleep threshold {}",
            self.timer.ticks_per_frame,
            self.timer.sleep_threshold
        );
    }

    /// Disable or re-enable throttling.
    pub fn set_full_speed(&mut self, full_speed: bool) {
        self.full_speed = full_speed;
    }

    #[must_use]
    pub fn full_speed(&self) -> bool {
        self.full_speed
    }

    #[must_use]
    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Block until the next frame deadline, schedule the one after, and hand
    /// off a completed audio fragment when one has accumulated.
    ///
    /// Called exactly once per emitted frame. Always returns within one
    /// frame period plus the bounded handoff window.
    pub fn wait_for_vbi(&mut self, audio: Option<&mut FragmentProducer>) {
        let previous_deadline = self.timer.next_deadline;
        let mut now = self.clock.now();

        // Ride out a wrapped deadline: the counter is still in the lap
        // before the wrap, so wait for it to roll past zero. Sleep while the
        // wrap is further away than the sleep granularity.
        if self.timer.rollover_pending {
            while now > self.timer.next_deadline
                && self.timer.next_deadline.wrapping_sub(now) < self.timer.ticks_per_frame
            {
                now = self.clock.now();
                let until_wrap = (u32::MAX - now).wrapping_add(1) as i32;
                if until_wrap > self.timer.sleep_threshold {
                    self.clock.sleep(SLEEP_SLICE_MS);
                    now = self.clock.now();
                }
            }
            self.timer.rollover_pending = false;
        }

        let mut spare = self.timer.next_deadline.wrapping_sub(now) as i32;

        if spare > 0 {
            if self.full_speed {
                if spare > self.timer.ticks_per_frame as i32 {
                    // Running ahead by more than a frame: resynchronize
                    // rather than let the deadline drift further out.
                    self.timer.next_deadline = now.wrapping_add(self.timer.ticks_per_frame);
                } else {
                    self.timer.next_deadline = self
                        .timer
                        .next_deadline
                        .wrapping_add(self.timer.ticks_per_frame);
                }
            } else {
                // Coarse wait: sleep in slices while the slack exceeds the
                // threshold, re-reading the clock each time.
                while spare > self.timer.sleep_threshold {
                    self.clock.sleep(SLEEP_SLICE_MS);
                    now = self.clock.now();
                    spare = self.timer.next_deadline.wrapping_sub(now) as i32;
                }
                // Fine wait: spin to the deadline for sub-granularity
                // precision.
                while self.timer.next_deadline.wrapping_sub(now) as i32 > 0 {
                    now = self.clock.now();
                }
                self.timer.next_deadline = self
                    .timer
                    .next_deadline
                    .wrapping_add(self.timer.ticks_per_frame);
            }
        } else if -spare > self.timer.ticks_per_frame as i32 {
            // Stalled by more than a frame: catch up immediately instead of
            // replaying the backlog.
            self.timer.next_deadline = now.wrapping_add(1);
        } else {
            self.timer.next_deadline = self
                .timer
                .next_deadline
                .wrapping_add(self.timer.ticks_per_frame);
        }

        if previous_deadline > self.timer.next_deadline {
            self.timer.rollover_pending = true;
        }

        if let Some(producer) = audio {
            if producer.fragment_elapsed() {
                producer.sync_and_advance(|millis| self.clock.sleep(millis));
            }
        }
    }
}
