//! TV standard selection.

/// Regional TV standard determining the target refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TvStandard {
    /// 50 Hz (Europe, Australia).
    #[default]
    Pal,
    /// 60 Hz (North America, Japan).
    Ntsc,
}

/// Refresh rates per standard, in frames per second.
///
/// Defaults to the nominal 50/60, kept configurable so a machine with a
/// non-standard field rate can still be paced. Read at calibration time only.
#[derive(Debug, Clone, Copy)]
pub struct RefreshRates {
    pub pal_hz: u32,
    pub ntsc_hz: u32,
}

impl Default for RefreshRates {
    fn default() -> Self {
        Self {
            pal_hz: 50,
            ntsc_hz: 60,
        }
    }
}

impl RefreshRates {
    /// Target refresh rate for the given standard.
    #[must_use]
    pub fn target_hz(&self, standard: TvStandard) -> u32 {
        match standard {
            TvStandard::Pal => self.pal_hz,
            TvStandard::Ntsc => self.ntsc_hz,
        }
    }
}
