//! Codec drivers for the bonnet.
//!
//! Only the register-level RT5645 driver lives here; the card itself talks
//! to any [`platform::Codec`].

pub mod rt5645;

pub use rt5645::{Rt5645, Rt5645Error};
