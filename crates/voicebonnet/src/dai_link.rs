//! The bonnet's single DAI link and its declared stream capability.

use platform::dai::{ClockPolarity, ClockRole, DaiProtocol};
use platform::{DaiEndpoint, DaiFormat, DaiLink, SampleWidth, StreamCapability};

/// Link name (matches the codec driver).
pub const LINK_NAME: &str = "rt5645";

/// PCM stream name exposed for the link.
pub const LINK_STREAM_NAME: &str = "Google AIY Voice Bonnet SoundCard HiFi";

/// Codec-side DAI.
pub const CODEC_DAI_NAME: &str = "rt5645-aif1";

/// I2S, normal bit and frame clocks, codec is slave on both.
pub const LINK_FORMAT: DaiFormat = DaiFormat {
    protocol: DaiProtocol::I2s,
    polarity: ClockPolarity::NormalBitNormalFrame,
    role: ClockRole::CodecSlave,
};

/// Stream limits the host enforces before any clock negotiation runs.
pub const STREAM_CAPABILITY: StreamCapability = StreamCapability {
    stream_name: "aiy-voicebonnet",
    formats: SampleWidth::S16Le.format_bit()
        | SampleWidth::S24Le.format_bit()
        | SampleWidth::S32Le.format_bit(),
    channels_min: 2,
    channels_max: 2,
    rate_min: 8_000,
    rate_max: 96_000,
};

/// Build the link for a resolved I2S controller.
///
/// The controller serves as both the CPU DAI and the platform (DMA)
/// component.
pub fn voice_bonnet_link(i2s: DaiEndpoint) -> DaiLink {
    DaiLink {
        name: LINK_NAME,
        stream_name: LINK_STREAM_NAME,
        cpu_dai: i2s.name,
        platform: i2s.name,
        codec_dai: CODEC_DAI_NAME,
        format: LINK_FORMAT,
    }
}
