//! Audio stream format types.
//!
//! - `SampleWidth`: the three little-endian PCM widths the link carries
//! - `HwParams`: the stream format proposed by the host at negotiation time

// ── SampleWidth ──────────────────────────────────────────────────────────────

/// PCM sample formats carried over the I2S link (all little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWidth {
    /// Signed 16-bit little-endian.
    S16Le,
    /// Signed 24-bit little-endian (in a 32-bit container).
    S24Le,
    /// Signed 32-bit little-endian.
    S32Le,
}

impl SampleWidth {
    /// Significant bits per sample.
    pub const fn bits(self) -> u8 {
        match self {
            Self::S16Le => 16,
            Self::S24Le => 24,
            Self::S32Le => 32,
        }
    }

    /// Bits occupied per sample on the wire.
    pub const fn physical_bits(self) -> u8 {
        match self {
            Self::S16Le => 16,
            Self::S24Le | Self::S32Le => 32,
        }
    }

    /// Format bit in a [`crate::dai::StreamCapability`] format mask.
    pub const fn format_bit(self) -> u32 {
        match self {
            Self::S16Le => 1 << 2,
            Self::S24Le => 1 << 6,
            Self::S32Le => 1 << 10,
        }
    }
}

// ── HwParams ─────────────────────────────────────────────────────────────────

/// Stream parameters proposed by the host on stream open / format change.
///
/// The rate is deliberately a raw `u32`: range enforcement belongs to the
/// host's capability check ([`crate::dai::StreamCapability::admits`]), not to
/// the clock negotiation that consumes these parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    /// Frame rate in Hz.
    pub rate_hz: u32,
    /// Sample format.
    pub width: SampleWidth,
    /// Interleaved channel count.
    pub channels: u8,
}

impl HwParams {
    /// Stereo parameters at `rate_hz` with the given sample width.
    pub const fn stereo(rate_hz: u32, width: SampleWidth) -> Self {
        Self {
            rate_hz,
            width,
            channels: 2,
        }
    }
}

impl Default for HwParams {
    fn default() -> Self {
        Self::stereo(48_000, SampleWidth::S16Le)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s24_occupies_a_32_bit_slot() {
        assert_eq!(SampleWidth::S24Le.bits(), 24);
        assert_eq!(SampleWidth::S24Le.physical_bits(), 32);
    }

    #[test]
    fn format_bits_are_distinct() {
        let bits = [
            SampleWidth::S16Le.format_bit(),
            SampleWidth::S24Le.format_bit(),
            SampleWidth::S32Le.format_bit(),
        ];
        assert_eq!(bits.iter().fold(0, |acc, b| acc | b).count_ones(), 3);
    }

    #[test]
    fn default_params_are_48k_stereo_16bit() {
        let p = HwParams::default();
        assert_eq!(p.rate_hz, 48_000);
        assert_eq!(p.channels, 2);
        assert_eq!(p.width, SampleWidth::S16Le);
    }
}
