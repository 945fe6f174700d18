//! Card error types.
//!
//! Two families, matching the two places the card can fail:
//!
//! - [`ConfigurationError`]: probe and one-time init. Fatal to card creation;
//!   the card is never published.
//! - [`ClockError`]: per-stream clock negotiation. Fatal only to that stream
//!   open; the card stays alive and a later negotiation is independent.
//!
//! Both carry the codec's own error value untouched so callers can tell the
//! exact cause apart. Nothing here is retried or degraded silently.

use platform::{JackAllocError, RegistrationError};
use thiserror_no_std::Error;

/// Probe / init failure. `E` is the codec's error type.
#[derive(Debug, Error)]
pub enum ConfigurationError<E: core::fmt::Debug> {
    /// The descriptor's compatible string is not ours.
    #[error("descriptor is not compatible with this driver")]
    Incompatible,
    /// A descriptor reference is missing or did not resolve.
    #[error("couldn't parse {0}")]
    UnresolvedReference(&'static str),
    /// Routing the filters to the I2S1 ASRC clock failed.
    #[error("selecting ASRC clock source failed: {0:?}")]
    AsrcSelect(E),
    /// Setting the provisional MCLK system clock failed.
    #[error("setting provisional sysclk failed: {0:?}")]
    ProvisionalSysclk(E),
    /// The host could not allocate the headphone jack.
    #[error("setting up headphone jack failed: {0}")]
    JackAllocation(JackAllocError),
    /// Enabling jack detection on the codec failed.
    #[error("wiring jack detection failed: {0:?}")]
    JackDetect(E),
    /// The host refused the card.
    #[error("card registration failed: {0}")]
    Registration(RegistrationError),
}

/// Clock negotiation failure. `E` is the codec's error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError<E: core::fmt::Debug> {
    /// `rate × 512` does not fit the PLL output register width.
    #[error("rate {0} Hz overflows the PLL output frequency")]
    RateOverflow(u32),
    /// PLL programming failed (divider constraints or lock).
    #[error("can't set codec pll: {0:?}")]
    Pll(E),
    /// Switching the input-direction sysclk to the PLL failed.
    #[error("can't set codec sysclk (input): {0:?}")]
    SysclkInput(E),
    /// Switching the output-direction sysclk to the PLL failed.
    #[error("can't set codec sysclk (output): {0:?}")]
    SysclkOutput(E),
}
