//! Per-card clock domain and stream clock negotiation.
//!
//! The codec's system clock moves through two phases:
//!
//! ```text
//! [Unconfigured] --provisional()--> [Mclk 24.576 MHz]
//!
//! any record --lock_pll() ok--> [PllRetuned(plan)] --switch_to_pll() ok--> [Pll(plan)]
//! [Pll(_)] / [PllRetuned(_)] --lock_pll() err--> [Unknown]
//! ```
//!
//! A switch to a PLL-derived sysclk needs a [`PllLocked`] token, and only a
//! successful `set_pll` produces one. There is no way to point the sysclk at
//! the PLL before the PLL has reported lock.
//!
//! Only `Pll(plan)` claims a PLL-derived sysclk, and only once both sysclk
//! directions track the lock. A locked PLL whose sysclk switch did not
//! complete is `PllRetuned`. A failed PLL reprogram keeps an MCLK record
//! (the sysclk never left MCLK) but turns a `Pll` record into `Unknown`.

use platform::board_config::{StreamClocking, PLATFORM_CLOCK_HZ};
use platform::{ClockDirection, Codec, HwParams, PllId, PllSource, SampleWidth, SysclkSource};

use crate::error::ClockError;

/// Clock configuration derived for one negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Requested sample rate (Hz).
    pub sample_rate_hz: u32,
    /// Requested sample width.
    pub width: SampleWidth,
    /// PLL output and sysclk frequency: `sample_rate_hz × 512`.
    pub pll_out_hz: u32,
    /// I2S bit clock the host will drive for this format, if it fits a `u32`.
    ///
    /// Informational only; the codec is slave to the host's bit clock.
    pub bclk_hz: Option<u32>,
}

impl ClockPlan {
    /// Derive the plan for `params`. `None` only if the PLL frequency overflows.
    pub fn for_params(params: &HwParams) -> Option<Self> {
        let clocking = StreamClocking {
            sample_rate_hz: params.rate_hz,
            slot_bits: params.width.physical_bits(),
            channels: params.channels,
        };
        Some(Self {
            sample_rate_hz: params.rate_hz,
            width: params.width,
            pll_out_hz: clocking.sysclk_hz()?,
            bclk_hz: clocking.bclk_hz(),
        })
    }
}

/// What the codec's system clock is known to run from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Nothing programmed yet.
    #[default]
    Unconfigured,
    /// Provisional reference: the board oscillator on MCLK.
    Mclk {
        /// MCLK frequency (Hz).
        freq_hz: u32,
    },
    /// PLL locked and both sysclk directions switched to it.
    Pll(ClockPlan),
    /// PLL locked for the plan, sysclk switch not completed.
    PllRetuned(ClockPlan),
    /// A failed reprogram left the PLL feeding the sysclk in an unknown state.
    Unknown,
}

impl ClockState {
    /// Current sysclk frequency, if known.
    pub fn sysclk_hz(&self) -> Option<u32> {
        match self {
            Self::Unconfigured | Self::PllRetuned(_) | Self::Unknown => None,
            Self::Mclk { freq_hz } => Some(*freq_hz),
            Self::Pll(plan) => Some(plan.pll_out_hz),
        }
    }
}

/// Proof that the PLL reported lock for a plan.
///
/// Only [`ClockDomain`] can construct it.
#[derive(Debug)]
#[must_use]
pub struct PllLocked {
    plan: ClockPlan,
}

impl PllLocked {
    /// The plan the PLL locked for.
    pub fn plan(&self) -> &ClockPlan {
        &self.plan
    }
}

/// A codec plus the recorded state of its clock tree.
///
/// The card keeps this behind its clock mutex; every method assumes the
/// caller holds exclusive access.
pub struct ClockDomain<C> {
    codec: C,
    state: ClockState,
}

impl<C: Codec> ClockDomain<C> {
    /// Wrap a freshly resolved codec.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            state: ClockState::Unconfigured,
        }
    }

    /// Recorded clock state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Direct codec access for one-time setup steps that are not clocking.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Give the codec back.
    pub fn into_codec(self) -> C {
        self.codec
    }

    /// Run the codec from the board oscillator on MCLK (input direction).
    ///
    /// Register access and idle jack detection work from this clock before
    /// any stream has been negotiated.
    pub async fn provisional(&mut self) -> Result<(), C::Error> {
        self.codec
            .set_sysclk(SysclkSource::Mclk, PLATFORM_CLOCK_HZ, ClockDirection::In)
            .await?;
        self.state = ClockState::Mclk {
            freq_hz: PLATFORM_CLOCK_HZ,
        };
        tracing::info!("codec sysclk provisional: MCLK {} Hz", PLATFORM_CLOCK_HZ);
        Ok(())
    }

    /// Program PLL1 from the board oscillator to `plan.pll_out_hz`.
    ///
    /// On success the record is `PllRetuned(plan)` until [`switch_to_pll`]
    /// completes.
    ///
    /// [`switch_to_pll`]: Self::switch_to_pll
    pub async fn lock_pll(&mut self, plan: ClockPlan) -> Result<PllLocked, ClockError<C::Error>> {
        match self
            .codec
            .set_pll(PllId::Pll1, PllSource::Mclk, PLATFORM_CLOCK_HZ, plan.pll_out_hz)
            .await
        {
            Ok(()) => {
                self.state = ClockState::PllRetuned(plan);
                Ok(PllLocked { plan })
            }
            Err(e) => {
                tracing::error!("can't set codec pll: {:?}", e);
                if !matches!(self.state, ClockState::Unconfigured | ClockState::Mclk { .. }) {
                    self.state = ClockState::Unknown;
                }
                Err(ClockError::Pll(e))
            }
        }
    }

    /// Point both sysclk directions at the locked PLL output.
    ///
    /// The output direction is repointed as well so no routing from an
    /// earlier negotiation survives.
    pub async fn switch_to_pll(&mut self, locked: PllLocked) -> Result<ClockPlan, ClockError<C::Error>> {
        let plan = locked.plan;
        if let Err(e) = self
            .codec
            .set_sysclk(SysclkSource::Pll1, plan.pll_out_hz, ClockDirection::In)
            .await
        {
            tracing::error!("can't set codec sysclk in: {:?}", e);
            return Err(ClockError::SysclkInput(e));
        }
        if let Err(e) = self
            .codec
            .set_sysclk(SysclkSource::Pll1, plan.pll_out_hz, ClockDirection::Out)
            .await
        {
            tracing::error!("can't set codec sysclk out: {:?}", e);
            return Err(ClockError::SysclkOutput(e));
        }
        self.state = ClockState::Pll(plan);
        tracing::info!(
            "codec sysclk on PLL1: {} Hz (bclk {:?} Hz)",
            plan.pll_out_hz,
            plan.bclk_hz
        );
        Ok(plan)
    }

    /// Reprogram the clock chain for a stream's hardware parameters.
    ///
    /// Identical parameters reprogram identical values; nothing is cached or
    /// skipped. Rate limits are enforced by the stream capability, not here.
    pub async fn negotiate(&mut self, params: &HwParams) -> Result<ClockPlan, ClockError<C::Error>> {
        tracing::debug!(
            "negotiating clocks: rate={} width={} channels={}",
            params.rate_hz,
            params.width.bits(),
            params.channels
        );
        let Some(plan) = ClockPlan::for_params(params) else {
            tracing::error!("rate {} Hz overflows the PLL output", params.rate_hz);
            return Err(ClockError::RateOverflow(params.rate_hz));
        };
        let locked = self.lock_pll(plan).await?;
        self.switch_to_pll(locked).await
    }
}
