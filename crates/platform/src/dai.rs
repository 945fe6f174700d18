//! Digital audio interface link descriptors.

use crate::audio_types::{HwParams, SampleWidth};

/// Wire protocol on a DAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaiProtocol {
    /// Philips I2S.
    I2s,
    /// Left justified.
    LeftJustified,
    /// Right justified.
    RightJustified,
    /// PCM DSP mode A.
    DspA,
}

/// Bit/frame clock polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPolarity {
    /// Normal bit clock, normal frame clock.
    NormalBitNormalFrame,
    /// Normal bit clock, inverted frame clock.
    NormalBitInvertedFrame,
    /// Inverted bit clock, normal frame clock.
    InvertedBitNormalFrame,
    /// Inverted bit clock, inverted frame clock.
    InvertedBitInvertedFrame,
}

/// Which side drives the bit and frame clocks, from the codec's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Codec is bit and frame clock master.
    CodecMaster,
    /// Codec is bit and frame clock slave; the CPU DAI drives both.
    CodecSlave,
}

/// Fixed format descriptor of a DAI link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    /// Wire protocol.
    pub protocol: DaiProtocol,
    /// Clock polarity.
    pub polarity: ClockPolarity,
    /// Clock role.
    pub role: ClockRole,
}

/// Pairing of a CPU-side and a codec-side DAI.
///
/// Built once at probe; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiLink {
    /// Link name.
    pub name: &'static str,
    /// PCM stream name.
    pub stream_name: &'static str,
    /// CPU-side DAI.
    pub cpu_dai: &'static str,
    /// Platform (DMA) component; the I2S controller on this board.
    pub platform: &'static str,
    /// Codec-side DAI.
    pub codec_dai: &'static str,
    /// Link format.
    pub format: DaiFormat,
}

/// Declared stream capability of a DAI link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamCapability {
    /// Stream name.
    pub stream_name: &'static str,
    /// Mask of [`SampleWidth::format_bit`] values.
    pub formats: u32,
    /// Minimum channel count.
    pub channels_min: u8,
    /// Maximum channel count.
    pub channels_max: u8,
    /// Minimum rate (Hz).
    pub rate_min: u32,
    /// Maximum rate (Hz).
    pub rate_max: u32,
}

impl StreamCapability {
    /// `true` if the link supports `width`.
    pub const fn supports_width(&self, width: SampleWidth) -> bool {
        self.formats & width.format_bit() != 0
    }

    /// `true` if `params` lie within the declared limits.
    pub fn admits(&self, params: &HwParams) -> bool {
        self.supports_width(params.width)
            && (self.channels_min..=self.channels_max).contains(&params.channels)
            && (self.rate_min..=self.rate_max).contains(&params.rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: StreamCapability = StreamCapability {
        stream_name: "test",
        formats: SampleWidth::S16Le.format_bit() | SampleWidth::S32Le.format_bit(),
        channels_min: 2,
        channels_max: 2,
        rate_min: 8_000,
        rate_max: 96_000,
    };

    #[test]
    fn admits_in_range_params() {
        assert!(CAP.admits(&HwParams::stereo(44_100, SampleWidth::S16Le)));
    }

    #[test]
    fn rejects_undeclared_width() {
        assert!(!CAP.admits(&HwParams::stereo(48_000, SampleWidth::S24Le)));
    }

    #[test]
    fn rejects_mono() {
        let params = HwParams {
            channels: 1,
            ..HwParams::default()
        };
        assert!(!CAP.admits(&params));
    }

    #[test]
    fn rejects_rates_outside_limits() {
        assert!(!CAP.admits(&HwParams::stereo(192_000, SampleWidth::S16Le)));
        assert!(!CAP.admits(&HwParams::stereo(4_000, SampleWidth::S16Le)));
    }
}
