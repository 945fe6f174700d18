//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform traits for use
//! in unit and integration tests.
//!
//! [`MockCodec`] is a cheap handle onto shared state: clone it before handing
//! it to a binder and the clone keeps observing every call the card makes,
//! even after a failed probe has dropped the original.

#![cfg(any(test, feature = "std"))]

use std::boxed::Box;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::board_config::{CODEC_REFERENCE_PROP, COMPATIBLE, I2S_REFERENCE_PROP};
use crate::*;

/// One recorded codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecCall {
    /// [`Codec::select_asrc_clock`]
    SelectAsrc {
        /// Filters routed.
        filters: AsrcFilters,
        /// Clock domain selected.
        source: AsrcClockSource,
    },
    /// [`Codec::set_sysclk`]
    SetSysclk {
        /// Clock source.
        source: SysclkSource,
        /// Frequency (Hz).
        freq_hz: u32,
        /// Direction.
        direction: ClockDirection,
    },
    /// [`Codec::set_pll`]
    SetPll {
        /// PLL programmed.
        pll: PllId,
        /// PLL input.
        source: PllSource,
        /// Input frequency (Hz).
        freq_in_hz: u32,
        /// Output frequency (Hz).
        freq_out_hz: u32,
    },
    /// [`Codec::set_jack_detect`]
    SetJackDetect,
}

/// Failures a [`MockCodec`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCodecError {
    /// ASRC selection rejected.
    Asrc,
    /// PLL did not lock at the requested output.
    PllUnlocked {
        /// Requested output frequency (Hz).
        freq_out_hz: u32,
    },
    /// Sysclk write rejected.
    Sysclk {
        /// Direction that failed.
        direction: ClockDirection,
    },
    /// Jack-detect IRQ could not be enabled.
    JackDetect,
}

/// Shared state behind a [`MockCodec`].
#[derive(Default)]
pub struct MockCodecState {
    /// Every call, in order (failed calls included).
    pub calls: Vec<CodecCall>,
    /// Current input-direction sysclk (source, Hz).
    pub sysclk_in: Option<(SysclkSource, u32)>,
    /// Current output-direction sysclk (source, Hz).
    pub sysclk_out: Option<(SysclkSource, u32)>,
    /// Current PLL setting (source, in Hz, out Hz).
    pub pll: Option<(PllSource, u32, u32)>,
    /// Wired jack, if detection is enabled.
    pub jack: Option<&'static dyn JackSink>,
    /// Fail ASRC selection.
    pub fail_asrc: bool,
    /// Fail PLL programming for this output frequency.
    pub fail_pll_out_hz: Option<u32>,
    /// Fail sysclk writes whose source is `.0` in direction `.1`.
    pub fail_sysclk: Option<(SysclkSource, ClockDirection)>,
    /// Fail jack-detect enabling.
    pub fail_jack_detect: bool,
    /// Yield to the executor inside every call.
    pub yield_in_calls: bool,
}

/// Mock codec: records all calls for test assertions.
#[derive(Clone, Default)]
pub struct MockCodec {
    state: Rc<RefCell<MockCodecState>>,
}

impl MockCodec {
    /// Create a new mock codec that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the shared state.
    pub fn state(&self) -> Ref<'_, MockCodecState> {
        self.state.borrow()
    }

    /// Mutably borrow the shared state (to inject failures).
    pub fn state_mut(&self) -> RefMut<'_, MockCodecState> {
        self.state.borrow_mut()
    }

    /// Copy of the call log.
    pub fn calls(&self) -> Vec<CodecCall> {
        self.state().calls.clone()
    }

    /// `true` once jack detection is wired.
    pub fn jack_wired(&self) -> bool {
        self.state().jack.is_some()
    }

    /// Simulate a detection interrupt.
    ///
    /// Returns `false` if no jack is wired.
    pub fn fire_jack_irq(&self, inserted: bool) -> bool {
        let jack = self.state().jack;
        match jack {
            Some(jack) => {
                jack.report(JackEvent {
                    status: if inserted {
                        JackType::HEADPHONE
                    } else {
                        JackType::empty()
                    },
                    mask: JackType::HEADPHONE,
                });
                true
            }
            None => false,
        }
    }

    async fn enter(&self, call: CodecCall) {
        let yield_now = {
            let mut state = self.state_mut();
            state.calls.push(call);
            state.yield_in_calls
        };
        if yield_now {
            embassy_futures::yield_now().await;
        }
    }
}

impl Codec for MockCodec {
    type Error = MockCodecError;

    async fn select_asrc_clock(
        &mut self,
        filters: AsrcFilters,
        source: AsrcClockSource,
    ) -> Result<(), Self::Error> {
        self.enter(CodecCall::SelectAsrc { filters, source }).await;
        if self.state().fail_asrc {
            return Err(MockCodecError::Asrc);
        }
        Ok(())
    }

    async fn set_sysclk(
        &mut self,
        source: SysclkSource,
        freq_hz: u32,
        direction: ClockDirection,
    ) -> Result<(), Self::Error> {
        self.enter(CodecCall::SetSysclk {
            source,
            freq_hz,
            direction,
        })
        .await;
        let mut state = self.state_mut();
        if state.fail_sysclk == Some((source, direction)) {
            return Err(MockCodecError::Sysclk { direction });
        }
        match direction {
            ClockDirection::In => state.sysclk_in = Some((source, freq_hz)),
            ClockDirection::Out => state.sysclk_out = Some((source, freq_hz)),
        }
        Ok(())
    }

    async fn set_pll(
        &mut self,
        pll: PllId,
        source: PllSource,
        freq_in_hz: u32,
        freq_out_hz: u32,
    ) -> Result<(), Self::Error> {
        self.enter(CodecCall::SetPll {
            pll,
            source,
            freq_in_hz,
            freq_out_hz,
        })
        .await;
        let mut state = self.state_mut();
        if state.fail_pll_out_hz == Some(freq_out_hz) {
            return Err(MockCodecError::PllUnlocked { freq_out_hz });
        }
        state.pll = Some((source, freq_in_hz, freq_out_hz));
        Ok(())
    }

    async fn set_jack_detect(&mut self, jack: &'static dyn JackSink) -> Result<(), Self::Error> {
        self.enter(CodecCall::SetJackDetect).await;
        let mut state = self.state_mut();
        if state.fail_jack_detect {
            return Err(MockCodecError::JackDetect);
        }
        state.jack = Some(jack);
        Ok(())
    }
}

/// Summary of a card published through [`MockBinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCard {
    /// Card name.
    pub name: String,
    /// DAI link.
    pub dai_link: DaiLink,
    /// Routing catalogue.
    pub routing: RoutingTable,
}

/// Mock host binder.
pub struct MockBinder {
    /// Reference that resolves to the codec.
    pub codec_reference: &'static str,
    /// Codec handed out on resolution (taken once).
    pub codec: Option<MockCodec>,
    /// Reference that resolves to the CPU DAI.
    pub dai_reference: &'static str,
    /// CPU DAI handed out on resolution.
    pub dai: DaiEndpoint,
    /// Fail jack allocation with this error.
    pub jack_error: Option<JackAllocError>,
    /// Fail registration with this error.
    pub registration_error: Option<RegistrationError>,
    /// Number of jacks allocated.
    pub jacks_allocated: usize,
    /// The last registered card.
    pub registered: Option<RegisteredCard>,
}

impl MockBinder {
    /// Codec reference used by [`MockBinder::descriptor`].
    pub const CODEC_REFERENCE: &'static str = "/soc/i2c@7e804000/rt5645@1a";
    /// I2S reference used by [`MockBinder::descriptor`].
    pub const I2S_REFERENCE: &'static str = "/soc/i2s@7e203000";

    /// Binder that resolves the default references to `codec`.
    pub fn new(codec: MockCodec) -> Self {
        Self {
            codec_reference: Self::CODEC_REFERENCE,
            codec: Some(codec),
            dai_reference: Self::I2S_REFERENCE,
            dai: DaiEndpoint {
                name: "bcm2835-i2s.0",
            },
            jack_error: None,
            registration_error: None,
            jacks_allocated: 0,
            registered: None,
        }
    }

    /// A compatible descriptor naming both default references.
    pub fn descriptor() -> BoardDescriptor<'static> {
        BoardDescriptor {
            compatible: COMPATIBLE,
            codec_reference: Some(Self::CODEC_REFERENCE),
            i2s_reference: Some(Self::I2S_REFERENCE),
            model: None,
        }
    }

    /// Descriptor property names, for diagnostics in tests.
    pub fn property_names() -> [&'static str; 2] {
        [CODEC_REFERENCE_PROP, I2S_REFERENCE_PROP]
    }
}

impl CardBinder for MockBinder {
    type Codec = MockCodec;

    fn resolve_codec(&mut self, reference: &str) -> Option<MockCodec> {
        if reference == self.codec_reference {
            self.codec.take()
        } else {
            None
        }
    }

    fn resolve_dai(&mut self, reference: &str) -> Option<DaiEndpoint> {
        (reference == self.dai_reference).then_some(self.dai)
    }

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn new_jack(
        &mut self,
        name: &'static str,
        types: JackType,
        pin: JackPin,
    ) -> Result<&'static Jack, JackAllocError> {
        if let Some(err) = self.jack_error {
            return Err(err);
        }
        self.jacks_allocated += 1;
        Ok(Box::leak(Box::new(Jack::new(name, types, pin))))
    }

    fn register_card(&mut self, card: &CardRegistration<'_>) -> Result<(), RegistrationError> {
        if let Some(err) = self.registration_error {
            return Err(err);
        }
        self.registered = Some(RegisteredCard {
            name: card.name.to_string(),
            dai_link: *card.dai_link,
            routing: *card.routing,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_codec_records_calls() {
        let mut codec = MockCodec::new();
        codec
            .set_sysclk(SysclkSource::Mclk, 24_576_000, ClockDirection::In)
            .await
            .unwrap();
        codec
            .set_pll(PllId::Pll1, PllSource::Mclk, 24_576_000, 49_152_000)
            .await
            .unwrap();
        assert_eq!(codec.calls().len(), 2);
        assert_eq!(codec.state().sysclk_in, Some((SysclkSource::Mclk, 24_576_000)));
        assert_eq!(codec.state().pll, Some((PllSource::Mclk, 24_576_000, 49_152_000)));
    }

    #[tokio::test]
    async fn test_mock_codec_injected_pll_failure_keeps_old_pll() {
        let mut codec = MockCodec::new();
        codec
            .set_pll(PllId::Pll1, PllSource::Mclk, 24_576_000, 24_576_000)
            .await
            .unwrap();
        codec.state_mut().fail_pll_out_hz = Some(22_579_200);
        let err = codec
            .set_pll(PllId::Pll1, PllSource::Mclk, 24_576_000, 22_579_200)
            .await
            .unwrap_err();
        assert_eq!(err, MockCodecError::PllUnlocked { freq_out_hz: 22_579_200 });
        assert_eq!(codec.state().pll, Some((PllSource::Mclk, 24_576_000, 24_576_000)));
    }

    #[tokio::test]
    async fn test_mock_codec_clone_shares_state() {
        let observer = MockCodec::new();
        let mut codec = observer.clone();
        codec
            .select_asrc_clock(AsrcFilters::DA_STEREO, AsrcClockSource::I2s1Asrc)
            .await
            .unwrap();
        drop(codec);
        assert_eq!(observer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_codec_fires_wired_jack() {
        let mut codec = MockCodec::new();
        assert!(!codec.fire_jack_irq(true));
        let mut binder = MockBinder::new(MockCodec::new());
        let jack = binder
            .new_jack(
                "Headphone Jack",
                JackType::HEADPHONE,
                JackPin {
                    pin: "Headphone",
                    mask: JackType::HEADPHONE,
                    invert: false,
                },
            )
            .unwrap();
        codec.set_jack_detect(jack).await.unwrap();
        assert!(codec.fire_jack_irq(true));
        assert!(jack.pin_enabled());
    }

    #[test]
    fn test_mock_binder_resolves_only_known_references() {
        let mut binder = MockBinder::new(MockCodec::new());
        assert!(binder.resolve_codec("/soc/nothing").is_none());
        assert!(binder.resolve_codec(MockBinder::CODEC_REFERENCE).is_some());
        // Taken once.
        assert!(binder.resolve_codec(MockBinder::CODEC_REFERENCE).is_none());
        assert!(binder.resolve_dai(MockBinder::I2S_REFERENCE).is_some());
        assert!(binder.resolve_dai("/soc/spi").is_none());
    }

    #[test]
    fn test_mock_binder_jack_failure() {
        let mut binder = MockBinder::new(MockCodec::new());
        binder.jack_error = Some(JackAllocError::HostRefused);
        let pin = JackPin {
            pin: "Headphone",
            mask: JackType::HEADPHONE,
            invert: false,
        };
        assert!(binder.new_jack("Headphone Jack", JackType::HEADPHONE, pin).is_err());
        assert_eq!(binder.jacks_allocated, 0);
    }

    #[test]
    fn test_property_names() {
        assert_eq!(
            MockBinder::property_names(),
            ["aiy-voicebonnet,audio-codec", "i2s-controller"]
        );
    }
}
