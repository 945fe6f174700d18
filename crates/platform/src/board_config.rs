//! Board configuration and constants for the AIY Voice Bonnet.
//!
//! All naming, descriptor property names and clock constants should
//! reference these values rather than hardcoding them.
//!
//! # Clock Chain
//!
//! The RT5645 runs its system clock from PLL1, which is fed by the board's
//! fixed 24.576 MHz oscillator on the codec MCLK pin:
//!
//! ```text
//! Oscillator (24.576 MHz) → RT5645 MCLK
//!   → PLL1 (Fout = 512 × fs)
//!   → SYSCLK (input and output direction)
//! ```
//!
//! For 48 kHz: PLL1 = 512 × 48 000 = 24.576 MHz (unity with the oscillator)
//! For 96 kHz: PLL1 = 512 × 96 000 = 49.152 MHz
//!
//! # I2C Bus Assignment
//!
//! | Peripheral | Address | Notes                          |
//! |------------|---------|--------------------------------|
//! | RT5645     | 0x1A    | 8-bit register, 16-bit value   |

/// Card name used when the descriptor carries no model override.
pub const CARD_NAME: &str = "snd_rpi_aiy_voicebonnet";

/// Capacity of the card name buffer, in bytes.
pub const CARD_NAME_CAPACITY: usize = 32;

/// Descriptor compatible string this driver binds to.
pub const COMPATIBLE: &str = "google,aiy-voicebonnet";

/// Host platform-driver name.
pub const DRIVER_NAME: &str = "snd-soc-aiy-voicebonnet";

/// Descriptor property holding the codec endpoint reference.
pub const CODEC_REFERENCE_PROP: &str = "aiy-voicebonnet,audio-codec";

/// Descriptor property holding the I2S controller reference.
pub const I2S_REFERENCE_PROP: &str = "i2s-controller";

/// Descriptor property holding the optional card model name.
pub const MODEL_PROP: &str = "google,model";

/// Board oscillator frequency on the codec MCLK pin (Hz).
///
/// This is also the provisional system clock the codec runs from before the
/// first stream negotiation configures PLL1.
pub const PLATFORM_CLOCK_HZ: u32 = 24_576_000;

/// PLL1 output / fs ratio. The board only supports this oversampling ratio.
pub const MCLK_FS_RATIO: u32 = 512;

/// RT5645 7-bit I2C address (hardware-fixed on the bonnet).
pub const RT5645_I2C_ADDR: u8 = 0x1A;

/// Per-stream clock figures derived from a frame rate.
///
/// Describes the clocking on the I2S link for one negotiated format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamClocking {
    /// Frame rate in Hz.
    pub sample_rate_hz: u32,
    /// Bits per slot on the wire.
    pub slot_bits: u8,
    /// Number of channels (slots per frame).
    pub channels: u8,
}

impl StreamClocking {
    /// Codec system clock: `MCLK_FS_RATIO × sample_rate_hz`.
    ///
    /// `None` if the product overflows `u32`.
    pub fn sysclk_hz(&self) -> Option<u32> {
        self.sample_rate_hz.checked_mul(MCLK_FS_RATIO)
    }

    /// Bit clock: `slot_bits × channels × sample_rate_hz`.
    pub fn bclk_hz(&self) -> Option<u32> {
        u32::from(self.slot_bits)
            .checked_mul(u32::from(self.channels))?
            .checked_mul(self.sample_rate_hz)
    }
}
