//! Google AIY Voice Bonnet sound card driver
//!
//! Binds the host's I2S controller to the bonnet's RT5645 codec, runs the
//! one-time codec setup and re-programs the codec's PLL whenever a stream's
//! hardware parameters are negotiated.
//!
//! # Architecture
//!
//! ```text
//! probe (card)
//!   ├─ CardBinder          resolve codec + I2S controller, allocate jack, register
//!   ├─ InitSequencer       ASRC routing → provisional MCLK sysclk → jack → detect IRQ
//!   └─ AudioCard
//!        ├─ hw_params ──▶ ClockDomain::negotiate   (serialised by the clock lock)
//!        └─ jack      ◀── codec IRQ / JackIrqMonitor (never takes the clock lock)
//! ```
//!
//! The widget / route / control catalogue ([`routing`]) and the link and
//! stream limits ([`dai_link`]) are constant data.
//!
//! # Features
//!
//! - `std` - Enable `platform::mocks` for host-side integration
//! - `defmt` - Enable defmt derives

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(async_fn_in_trait)] // single-threaded executors, Send bounds not needed

pub mod card;
pub mod clock;
pub mod codec;
pub mod dai_link;
pub mod error;
pub mod init;
pub mod jack_irq;
pub mod routing;

pub use card::{probe, AudioCard};
pub use clock::{ClockDomain, ClockPlan, ClockState, PllLocked};
pub use codec::{Rt5645, Rt5645Error};
pub use dai_link::{voice_bonnet_link, STREAM_CAPABILITY};
pub use error::{ClockError, ConfigurationError};
pub use init::InitSequencer;
pub use jack_irq::JackIrqMonitor;
pub use routing::VOICE_BONNET_ROUTING;
