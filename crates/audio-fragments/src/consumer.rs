//! Renderer-thread side of the fragment handoff.

use std::sync::Arc;

use ringbuf::HeapCons;
use ringbuf::traits::Consumer as _;

use crate::handoff::{FragmentConfig, HandoffIndices};

/// Sample value substituted on underrun.
pub const REST_LEVEL: f32 = 0.0;

/// Playback-side half of the fragment ring. Owned by the audio renderer.
pub struct FragmentConsumer {
    indices: Arc<HandoffIndices>,
    samples: HeapCons<f32>,
    fragment_samples: usize,
    fragment_count: usize,
    popped: usize,
}

impl FragmentConsumer {
    pub(crate) fn new(
        config: &FragmentConfig,
        indices: Arc<HandoffIndices>,
        samples: HeapCons<f32>,
    ) -> Self {
        Self {
            indices,
            samples,
            fragment_samples: config.fragment_samples,
            fragment_count: config.fragment_count,
            popped: 0,
        }
    }

    /// Fill a playback buffer, substituting the rest level on underrun.
    ///
    /// Advances the consume index each time a full fragment's worth of
    /// samples has been popped.
    pub fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            if let Some(sample) = self.samples.try_pop() {
                *slot = sample;
                self.popped += 1;
                if self.popped == self.fragment_samples {
                    self.popped = 0;
                    self.indices
                        .set_consume((self.indices.consume() + 1) % self.fragment_count);
                }
            } else {
                *slot = REST_LEVEL;
            }
        }
    }

    /// Current consume index, modulo the fragment count.
    #[must_use]
    pub fn consume_index(&self) -> usize {
        self.indices.consume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment_ring;

    fn small_config() -> FragmentConfig {
        FragmentConfig {
            sample_rate: 44_100,
            fragment_samples: 4,
            fragment_count: 2,
            frames_per_fragment: 1,
        }
    }

    #[test]
    fn fill_pops_samples_and_steps_consume_per_fragment() {
        let (mut producer, mut consumer) = fragment_ring(small_config());
        producer.write_samples(&[0.1, 0.2, 0.3, 0.4]);
        producer.sync_and_advance(|_| {});

        let mut out = [0.0f32; 4];
        consumer.fill(&mut out);
        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(consumer.consume_index(), 1);
    }

    #[test]
    fn partial_fragment_does_not_step_consume() {
        let (mut producer, mut consumer) = fragment_ring(small_config());
        producer.write_samples(&[0.1, 0.2, 0.3, 0.4]);
        producer.sync_and_advance(|_| {});

        let mut out = [0.0f32; 2];
        consumer.fill(&mut out);
        assert_eq!(consumer.consume_index(), 0);
        consumer.fill(&mut out);
        assert_eq!(consumer.consume_index(), 1);
    }

    #[test]
    fn underrun_substitutes_rest_level() {
        let (_producer, mut consumer) = fragment_ring(small_config());
        let mut out = [1.0f32; 3];
        consumer.fill(&mut out);
        assert_eq!(out, [REST_LEVEL; 3]);
        assert_eq!(consumer.consume_index(), 0);
    }
}
