//! Realtek RT5645 audio codec (I²C control, I²S audio)
//!
//! The audio stream is carried on I²S by the host's controller; this driver
//! only programs the codec's clock tree, ASRC routing and jack-detect IRQ.
//!
//! # I²C Address
//!
//! | Board        | Address |
//! |--------------|---------|
//! | Voice Bonnet | `0x1A`  |

mod driver;
pub mod pll;
pub mod registers;

pub use driver::{Rt5645, Rt5645Error};
pub use pll::{PllCoefficients, PllError};
