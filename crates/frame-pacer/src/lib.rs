//! Wall-clock pacing for an emulated machine's frame loop.
//!
//! The emulation main loop calls [`VbiPacer::wait_for_vbi`] once per emitted
//! frame; the pacer holds the loop to the selected TV standard's refresh rate
//! using a hybrid sleep/spin wait over a 32-bit monotonic counter, handles
//! counter wraparound explicitly, and performs the bounded handoff of
//! completed audio fragments to the playback thread.
//!
//! Call order: [`VbiPacer::examine`] once at startup, [`VbiPacer::reset`]
//! before first use and after any region change, then `wait_for_vbi` once
//! per frame.

mod clock;
mod pacer;
mod region;
pub mod sim;
mod timer;

pub use clock::{ClockSource, HOST_TICK_HZ, HostClock};
pub use pacer::VbiPacer;
pub use region::{RefreshRates, TvStandard};
pub use timer::{SLEEP_SLICE_MS, TimerState};
