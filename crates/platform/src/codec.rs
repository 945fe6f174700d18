//! Codec clocking abstraction
//!
//! The card driver never touches codec registers directly; it drives the
//! codec through this trait. Every method is a register-programming step on a
//! transport that is not reentrant, so callers serialise access per card.

use crate::jack::JackSink;

/// Codec trait: the clock, PLL, ASRC and jack-detect programming surface.
pub trait Codec {
    /// Error type
    type Error: core::fmt::Debug;

    /// Route the ASRC clock domain of the given internal filters to `source`.
    fn select_asrc_clock(
        &mut self,
        filters: AsrcFilters,
        source: AsrcClockSource,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Select the system clock source and frequency for one clock direction.
    fn set_sysclk(
        &mut self,
        source: SysclkSource,
        freq_hz: u32,
        direction: ClockDirection,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Program `pll` to produce `freq_out_hz` from `freq_in_hz` on `source`.
    ///
    /// Returns only once the PLL output is usable; an error means the codec
    /// is not running from a PLL-derived clock at the requested frequency.
    fn set_pll(
        &mut self,
        pll: PllId,
        source: PllSource,
        freq_in_hz: u32,
        freq_out_hz: u32,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Enable jack detection and report state changes to `jack`.
    fn set_jack_detect(
        &mut self,
        jack: &'static dyn JackSink,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Clock direction relative to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDirection {
    /// Clock consumed by the codec.
    In,
    /// Clock driven by the codec.
    Out,
}

/// Codec system clock sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysclkSource {
    /// External master clock pin.
    Mclk,
    /// PLL1 output.
    Pll1,
    /// Internal RC oscillator.
    RcClock,
}

/// Codec PLL input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSource {
    /// External master clock pin.
    Mclk,
    /// Bit clock of I2S interface 1.
    Bclk1,
    /// Bit clock of I2S interface 2.
    Bclk2,
}

/// Codec PLL identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllId {
    /// The codec's single PLL.
    Pll1,
}

/// Clock domains selectable for the codec's ASRC-capable filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AsrcClockSource {
    /// Filters clocked from the system clock.
    Sysclk,
    /// Filters clocked from the ASRC tracking I2S interface 1.
    I2s1Asrc,
    /// Filters clocked from the ASRC tracking I2S interface 2.
    I2s2Asrc,
}

/// Set of codec digital filters, as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct AsrcFilters(u8);

impl AsrcFilters {
    /// Stereo DAC filter.
    pub const DA_STEREO: Self = Self(1 << 0);
    /// Stereo ADC filter.
    pub const AD_STEREO: Self = Self(1 << 1);
    /// Left mono DAC filter.
    pub const DA_MONO_L: Self = Self(1 << 2);
    /// Right mono DAC filter.
    pub const DA_MONO_R: Self = Self(1 << 3);
    /// Left mono ADC filter.
    pub const AD_MONO_L: Self = Self(1 << 4);
    /// Right mono ADC filter.
    pub const AD_MONO_R: Self = Self(1 << 5);

    /// Empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Union of two filter sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `true` if every filter in `other` is in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if no filter is selected.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit mask.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for AsrcFilters {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_union_contains_members() {
        let set = AsrcFilters::DA_STEREO | AsrcFilters::DA_MONO_L;
        assert!(set.contains(AsrcFilters::DA_STEREO));
        assert!(set.contains(AsrcFilters::DA_MONO_L));
        assert!(!set.contains(AsrcFilters::AD_STEREO));
    }

    #[test]
    fn empty_filter_set() {
        assert!(AsrcFilters::empty().is_empty());
        assert!(!AsrcFilters::AD_MONO_R.is_empty());
    }

    #[test]
    fn filter_bits_are_single_bits() {
        for f in [
            AsrcFilters::DA_STEREO,
            AsrcFilters::AD_STEREO,
            AsrcFilters::DA_MONO_L,
            AsrcFilters::DA_MONO_R,
            AsrcFilters::AD_MONO_L,
            AsrcFilters::AD_MONO_R,
        ] {
            assert_eq!(f.bits().count_ones(), 1);
        }
    }
}
