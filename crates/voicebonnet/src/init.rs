//! One-time card initialisation.
//!
//! ```text
//! [SelectAsrc] --select_asrc()--> [ProvisionalClock] --provisional_clock()--> [AllocateJack]
//!     --allocate_jack()--> [WireDetection] --wire_detection()--> &'static Jack
//! ```
//!
//! Each step consumes the sequencer, so a later step cannot run unless every
//! earlier one returned `Ok`. A failed jack allocation ends the sequence
//! before the codec is ever handed a jack, leaving nothing half-wired.

use platform::{
    AsrcClockSource, AsrcFilters, CardBinder, Codec, Jack, JackPin, JackSink, JackType,
};

use crate::clock::ClockDomain;
use crate::error::ConfigurationError;

/// Filters clocked from the I2S1 ASRC instead of the raw bit clock.
///
/// At high rates BCLK is not bit-exact with LRCLK, so these filters track
/// the ASRC clock.
pub const ASRC_FILTERS: AsrcFilters = AsrcFilters::DA_STEREO
    .union(AsrcFilters::AD_STEREO)
    .union(AsrcFilters::DA_MONO_L)
    .union(AsrcFilters::DA_MONO_R);

/// Name of the headphone jack input device.
pub const HEADPHONE_JACK_NAME: &str = "Headphone Jack";

/// Switch types the headphone jack reports.
pub const HEADPHONE_JACK_TYPES: JackType = JackType::HEADPHONE;

/// The headphone jack's only pin.
pub const HEADPHONE_JACK_PIN: JackPin = JackPin {
    pin: "Headphone",
    mask: JackType::from_bits(0xF_FFFF),
    invert: false,
};

type InitResult<T, B> = Result<T, ConfigurationError<<<B as CardBinder>::Codec as Codec>::Error>>;

/// Stage: ASRC clock selection pending.
pub struct SelectAsrc;
/// Stage: provisional MCLK sysclk pending.
pub struct ProvisionalClock;
/// Stage: jack allocation pending.
pub struct AllocateJack;
/// Stage: jack allocated, detection not yet wired.
pub struct WireDetection {
    jack: &'static Jack,
}

/// Typestate driver for the one-time init steps.
pub struct InitSequencer<'a, B: CardBinder, Stage> {
    domain: &'a mut ClockDomain<B::Codec>,
    binder: &'a mut B,
    stage: Stage,
}

impl<'a, B: CardBinder, Stage> InitSequencer<'a, B, Stage> {
    fn advance<Next>(self, stage: Next) -> InitSequencer<'a, B, Next> {
        InitSequencer {
            domain: self.domain,
            binder: self.binder,
            stage,
        }
    }
}

impl<'a, B: CardBinder> InitSequencer<'a, B, SelectAsrc> {
    /// Start the sequence on a freshly bound codec.
    pub fn new(domain: &'a mut ClockDomain<B::Codec>, binder: &'a mut B) -> Self {
        Self {
            domain,
            binder,
            stage: SelectAsrc,
        }
    }

    /// Run every step in order and return the wired jack.
    pub async fn run(self) -> InitResult<&'static Jack, B> {
        self.select_asrc()
            .await?
            .provisional_clock()
            .await?
            .allocate_jack()?
            .wire_detection()
            .await
    }

    /// Route [`ASRC_FILTERS`] to the I2S1 ASRC clock.
    pub async fn select_asrc(self) -> InitResult<InitSequencer<'a, B, ProvisionalClock>, B> {
        self.domain
            .codec_mut()
            .select_asrc_clock(ASRC_FILTERS, AsrcClockSource::I2s1Asrc)
            .await
            .map_err(|e| {
                tracing::error!("selecting ASRC clock source failed: {:?}", e);
                ConfigurationError::AsrcSelect(e)
            })?;
        Ok(self.advance(ProvisionalClock))
    }
}

impl<'a, B: CardBinder> InitSequencer<'a, B, ProvisionalClock> {
    /// Run the codec from MCLK until a stream negotiates the PLL.
    pub async fn provisional_clock(self) -> InitResult<InitSequencer<'a, B, AllocateJack>, B> {
        self.domain.provisional().await.map_err(|e| {
            tracing::error!("setting provisional sysclk failed: {:?}", e);
            ConfigurationError::ProvisionalSysclk(e)
        })?;
        Ok(self.advance(AllocateJack))
    }
}

impl<'a, B: CardBinder> InitSequencer<'a, B, AllocateJack> {
    /// Ask the host for the headphone jack input device.
    pub fn allocate_jack(self) -> InitResult<InitSequencer<'a, B, WireDetection>, B> {
        let jack = self
            .binder
            .new_jack(HEADPHONE_JACK_NAME, HEADPHONE_JACK_TYPES, HEADPHONE_JACK_PIN)
            .map_err(|e| {
                tracing::error!("setting up headphone jack failed: {}", e);
                ConfigurationError::JackAllocation(e)
            })?;
        Ok(self.advance(WireDetection { jack }))
    }
}

impl<B: CardBinder> InitSequencer<'_, B, WireDetection> {
    /// The allocated jack.
    pub fn jack(&self) -> &'static Jack {
        self.stage.jack
    }

    /// Have the codec's detection interrupt report into the jack.
    pub async fn wire_detection(self) -> InitResult<&'static Jack, B> {
        let jack = self.stage.jack;
        let sink: &'static dyn JackSink = jack;
        self.domain
            .codec_mut()
            .set_jack_detect(sink)
            .await
            .map_err(|e| {
                tracing::error!("wiring jack detection failed: {:?}", e);
                ConfigurationError::JackDetect(e)
            })?;
        tracing::debug!("{} wired", jack.name());
        Ok(jack)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ClockState;
    use platform::mocks::{CodecCall, MockBinder, MockCodec};
    use platform::{ClockDirection, JackAllocError, SysclkSource};

    fn setup() -> (ClockDomain<MockCodec>, MockBinder, MockCodec) {
        let codec = MockCodec::new();
        (
            ClockDomain::new(codec.clone()),
            MockBinder::new(MockCodec::new()),
            codec,
        )
    }

    #[tokio::test]
    async fn full_sequence_wires_headphone_jack() {
        let (mut domain, mut binder, codec) = setup();
        let jack = InitSequencer::new(&mut domain, &mut binder).run().await.unwrap();
        assert_eq!(jack.name(), "Headphone Jack");
        assert_eq!(jack.types(), JackType::HEADPHONE);
        assert_eq!(jack.pin().mask.bits(), 0xF_FFFF);
        assert!(!jack.pin().invert);
        assert_eq!(
            codec.calls(),
            [
                CodecCall::SelectAsrc {
                    filters: ASRC_FILTERS,
                    source: AsrcClockSource::I2s1Asrc,
                },
                CodecCall::SetSysclk {
                    source: SysclkSource::Mclk,
                    freq_hz: 24_576_000,
                    direction: ClockDirection::In,
                },
                CodecCall::SetJackDetect,
            ]
        );
        assert!(codec.jack_wired());
        assert_eq!(domain.state(), ClockState::Mclk { freq_hz: 24_576_000 });
    }

    #[test]
    fn asrc_filters_are_the_dac_and_stereo_adc_set() {
        assert!(ASRC_FILTERS.contains(AsrcFilters::DA_STEREO | AsrcFilters::AD_STEREO));
        assert!(ASRC_FILTERS.contains(AsrcFilters::DA_MONO_L | AsrcFilters::DA_MONO_R));
        assert!(!ASRC_FILTERS.contains(AsrcFilters::AD_MONO_L));
        assert!(!ASRC_FILTERS.contains(AsrcFilters::AD_MONO_R));
    }

    #[tokio::test]
    async fn jack_allocation_failure_stops_before_wiring() {
        let (mut domain, mut binder, codec) = setup();
        binder.jack_error = Some(JackAllocError::HostRefused);
        let err = InitSequencer::new(&mut domain, &mut binder).run().await.unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::JackAllocation(JackAllocError::HostRefused)
        ));
        assert!(!codec.calls().contains(&CodecCall::SetJackDetect));
        assert!(!codec.jack_wired());
        // Codec left on the provisional clock.
        assert_eq!(codec.state().sysclk_in, Some((SysclkSource::Mclk, 24_576_000)));
    }

    #[tokio::test]
    async fn asrc_failure_aborts_everything_after() {
        let (mut domain, mut binder, codec) = setup();
        codec.state_mut().fail_asrc = true;
        let err = InitSequencer::new(&mut domain, &mut binder).run().await.unwrap_err();
        assert!(matches!(err, ConfigurationError::AsrcSelect(_)));
        assert_eq!(codec.calls().len(), 1);
        assert_eq!(binder.jacks_allocated, 0);
    }

    #[tokio::test]
    async fn provisional_failure_allocates_no_jack() {
        let (mut domain, mut binder, codec) = setup();
        codec.state_mut().fail_sysclk = Some((SysclkSource::Mclk, ClockDirection::In));
        let err = InitSequencer::new(&mut domain, &mut binder).run().await.unwrap_err();
        assert!(matches!(err, ConfigurationError::ProvisionalSysclk(_)));
        assert_eq!(binder.jacks_allocated, 0);
        assert_eq!(domain.state(), ClockState::Unconfigured);
    }

    #[tokio::test]
    async fn detect_failure_is_reported() {
        let (mut domain, mut binder, codec) = setup();
        codec.state_mut().fail_jack_detect = true;
        let err = InitSequencer::new(&mut domain, &mut binder).run().await.unwrap_err();
        assert!(matches!(err, ConfigurationError::JackDetect(_)));
        assert!(!codec.jack_wired());
    }

    #[tokio::test]
    async fn steps_can_be_driven_individually() {
        let (mut domain, mut binder, codec) = setup();
        let stage = InitSequencer::new(&mut domain, &mut binder)
            .select_asrc()
            .await
            .unwrap()
            .provisional_clock()
            .await
            .unwrap()
            .allocate_jack()
            .unwrap();
        assert_eq!(stage.jack().name(), HEADPHONE_JACK_NAME);
        assert!(!codec.jack_wired());
        stage.wire_detection().await.unwrap();
        assert!(codec.jack_wired());
    }
}
