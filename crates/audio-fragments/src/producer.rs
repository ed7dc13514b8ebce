//! Pacing-thread side of the fragment handoff.

use std::sync::Arc;

use ringbuf::HeapProd;
use ringbuf::traits::Producer as _;

use crate::handoff::{FragmentConfig, HandoffIndices};

/// Polls of the consumer index before production proceeds regardless.
pub const SYNC_RETRY_LIMIT: u32 = 50;

/// Emulation-side half of the fragment ring.
///
/// Samples accumulate in a staged fragment; once enough frames have been
/// written, [`sync_and_advance`](Self::sync_and_advance) flushes the stage
/// into the ring and steps the produce index. Owned by the pacing thread.
pub struct FragmentProducer {
    config: FragmentConfig,
    indices: Arc<HandoffIndices>,
    samples: HeapProd<f32>,
    staging: Vec<f32>,
    cursor: usize,
    frame_count: u32,
    paused: bool,
}

impl FragmentProducer {
    pub(crate) fn new(
        config: FragmentConfig,
        indices: Arc<HandoffIndices>,
        samples: HeapProd<f32>,
    ) -> Self {
        Self {
            staging: vec![0.0; config.fragment_samples],
            config,
            indices,
            samples,
            cursor: 0,
            frame_count: 0,
            paused: false,
        }
    }

    /// Append samples to the staged fragment.
    ///
    /// Samples past the fragment boundary are dropped; that is a glitch,
    /// not an error.
    pub fn write_samples(&mut self, samples: &[f32]) {
        let free = self.config.fragment_samples - self.cursor;
        let take = samples.len().min(free);
        self.staging[self.cursor..self.cursor + take].copy_from_slice(&samples[..take]);
        self.cursor += take;
        if take < samples.len() {
            log::trace!("fragment overflow: dropped {} samples", samples.len() - take);
        }
    }

    /// Record that one video frame's worth of audio has been written.
    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    /// True once enough frames have accumulated to hand off a fragment.
    #[must_use]
    pub fn fragment_elapsed(&self) -> bool {
        self.frame_count > self.config.frames_per_fragment
    }

    /// Pause suppresses the catch-up poll in
    /// [`sync_and_advance`](Self::sync_and_advance), not production itself.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current produce index, modulo the fragment count.
    #[must_use]
    pub fn produce_index(&self) -> usize {
        self.indices.produce()
    }

    /// Samples written to the staged fragment so far.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn config(&self) -> &FragmentConfig {
        &self.config
    }

    /// Hand the staged fragment to the renderer and start the next one.
    ///
    /// Unless paused, polls the consumer index through `sleep(1)` for at most
    /// [`SYNC_RETRY_LIMIT`] iterations. The poll stands in for a blocking
    /// primitive: the critical section is tiny, and when the ceiling expires
    /// production proceeds anyway, trading an audible glitch for forward
    /// progress. The produce index always steps exactly once per call.
    pub fn sync_and_advance(&mut self, mut sleep: impl FnMut(u64)) {
        if !self.paused {
            let mut retries = SYNC_RETRY_LIMIT;
            while !self.indices.caught_up() && retries > 0 {
                retries -= 1;
                sleep(1);
            }
            if retries == 0 {
                log::trace!("audio renderer still behind after {SYNC_RETRY_LIMIT} polls");
            }
        }

        for &sample in &self.staging {
            if self.samples.try_push(sample).is_err() {
                log::trace!("fragment ring full, fragment truncated");
                break;
            }
        }
        self.indices
            .set_produce((self.indices.produce() + 1) % self.config.fragment_count);

        self.staging.fill(0.0);
        self.cursor = 0;
        self.frame_count = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment_ring;

    fn small_config() -> FragmentConfig {
        FragmentConfig {
            sample_rate: 44_100,
            fragment_samples: 8,
            fragment_count: 2,
            frames_per_fragment: 2,
        }
    }

    #[test]
    fn fragment_elapses_after_threshold_frames() {
        let (mut producer, _consumer) = fragment_ring(small_config());
        producer.end_frame();
        producer.end_frame();
        assert!(!producer.fragment_elapsed());
        producer.end_frame();
        assert!(producer.fragment_elapsed());
    }

    #[test]
    fn advance_steps_produce_index_mod_count() {
        let (mut producer, _consumer) = fragment_ring(small_config());
        producer.sync_and_advance(|_| {});
        assert_eq!(producer.produce_index(), 1);

        // The consumer never ran, so the poll must hit its ceiling and the
        // index must still advance, wrapping back to zero.
        let mut sleeps = 0;
        producer.sync_and_advance(|_| sleeps += 1);
        assert_eq!(sleeps, SYNC_RETRY_LIMIT);
        assert_eq!(producer.produce_index(), 0);
    }

    #[test]
    fn paused_producer_skips_the_poll() {
        let (mut producer, _consumer) = fragment_ring(small_config());
        producer.sync_and_advance(|_| {});
        producer.set_paused(true);

        let mut sleeps = 0;
        producer.sync_and_advance(|_| sleeps += 1);
        assert_eq!(sleeps, 0);
        assert_eq!(producer.produce_index(), 0);
    }

    #[test]
    fn advance_resets_stage_and_frame_count() {
        let (mut producer, _consumer) = fragment_ring(small_config());
        producer.write_samples(&[0.5; 8]);
        producer.end_frame();
        producer.end_frame();
        producer.end_frame();
        assert!(producer.fragment_elapsed());

        producer.sync_and_advance(|_| {});
        assert_eq!(producer.staged_len(), 0);
        assert!(!producer.fragment_elapsed());
    }

    #[test]
    fn overflow_drops_excess_samples() {
        let (mut producer, _consumer) = fragment_ring(small_config());
        producer.write_samples(&[0.1; 6]);
        producer.write_samples(&[0.2; 6]);
        assert_eq!(producer.staged_len(), 8);
    }
}
