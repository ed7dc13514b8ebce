//! Fragment ring layout and the cross-thread handoff indices.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Layout of the fragment ring.
#[derive(Debug, Clone, Copy)]
pub struct FragmentConfig {
    /// Playback sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per fragment (mono).
    pub fragment_samples: usize,
    /// Number of fragments in the ring.
    pub fragment_count: usize,
    /// Video frames of audio accumulated before a fragment is handed off.
    pub frames_per_fragment: u32,
}

impl FragmentConfig {
    /// Config with the fragment sized to hold `frames_per_fragment` frames
    /// of audio at the given refresh rate.
    ///
    /// 44100 Hz at 50 fps with 2 frames per fragment gives 1764 samples.
    #[must_use]
    pub fn for_refresh_rate(
        sample_rate: u32,
        refresh_hz: u32,
        frames_per_fragment: u32,
        fragment_count: usize,
    ) -> Self {
        let samples_per_frame = (sample_rate / refresh_hz.max(1)) as usize;
        Self {
            sample_rate,
            fragment_samples: samples_per_frame * frames_per_fragment as usize,
            fragment_count,
            frames_per_fragment,
        }
    }
}

/// Producer/consumer fragment positions, each modulo the fragment count.
///
/// Each index is written by exactly one thread and read by the other.
/// Relaxed ordering is sufficient: a stale read delays the handoff by one
/// poll, it cannot corrupt the sample stream (the ring itself is the SPSC
/// structure carrying the data).
#[derive(Debug, Default)]
pub struct HandoffIndices {
    produce: AtomicUsize,
    consume: AtomicUsize,
}

impl HandoffIndices {
    pub(crate) fn produce(&self) -> usize {
        self.produce.load(Ordering::Relaxed)
    }

    pub(crate) fn consume(&self) -> usize {
        self.consume.load(Ordering::Relaxed)
    }

    pub(crate) fn set_produce(&self, index: usize) {
        self.produce.store(index, Ordering::Relaxed);
    }

    pub(crate) fn set_consume(&self, index: usize) {
        self.consume.store(index, Ordering::Relaxed);
    }

    /// True when the renderer has consumed every handed-off fragment.
    pub(crate) fn caught_up(&self) -> bool {
        self.produce() == self.consume()
    }
}
