//! Audio fragment handoff between an emulation thread and playback.
//!
//! The emulation thread writes samples into a staged fragment and hands
//! completed fragments to the audio renderer through a lock-free SPSC ring.
//! Two indices track progress: `produce` is advanced only by the emulation
//! thread, `consume` only by the renderer. Synchronization is a bounded poll,
//! never a lock: a missed handoff glitches playback but cannot stall the
//! frame loop.

mod consumer;
mod handoff;
mod output;
mod producer;

pub use consumer::{FragmentConsumer, REST_LEVEL};
pub use handoff::{FragmentConfig, HandoffIndices};
pub use output::AudioOutput;
pub use producer::{FragmentProducer, SYNC_RETRY_LIMIT};

use std::sync::Arc;

use ringbuf::{HeapRb, traits::Split};

/// Create a fragment ring and split it into its two thread-owned halves.
#[must_use]
pub fn fragment_ring(config: FragmentConfig) -> (FragmentProducer, FragmentConsumer) {
    let ring = HeapRb::<f32>::new(config.fragment_samples * config.fragment_count);
    let (producer, consumer) = ring.split();
    let indices = Arc::new(HandoffIndices::default());
    (
        FragmentProducer::new(config, Arc::clone(&indices), producer),
        FragmentConsumer::new(&config, indices, consumer),
    )
}
