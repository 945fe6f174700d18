//! Hardware Abstraction Layer (HAL) for the AIY Voice Bonnet sound card
//!
//! This crate provides trait-based abstractions for the collaborators the
//! card driver talks to, so the card can be developed and tested without a
//! codec on the bus or a sound core to register with.
//!
//! # Architecture Layers
//!
//! ```text
//! Card driver (voicebonnet crate: probe, init, clock negotiation)
//!         ↓
//! Platform HAL (this crate - trait abstractions + shared types)
//!         ↓
//! Host sound core / codec register transport
//! ```
//!
//! # Abstractions
//!
//! - [`Codec`] - codec-side clock, PLL, ASRC and jack-detect programming
//! - [`CardBinder`] - reference resolution, jack allocation, card registration
//! - [`Jack`] - interrupt-safe jack state record
//! - [`dai`] - DAI link descriptors and stream capabilities
//! - [`dapm`] - widget / route / control catalogue types
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module (for testing)
//! - `defmt`: Enable defmt derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-threaded executors, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio_types;
pub mod binder;
pub mod board_config;
pub mod codec;
pub mod dai;
pub mod dapm;
pub mod jack;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use binder::{BoardDescriptor, CardBinder, CardRegistration, DaiEndpoint, RegistrationError};
pub use codec::{
    AsrcClockSource, AsrcFilters, ClockDirection, Codec, PllId, PllSource, SysclkSource,
};
pub use jack::{Jack, JackAllocError, JackEvent, JackPin, JackReport, JackSink, JackSlot, JackType};

// Re-export audio format types
pub use audio_types::{HwParams, SampleWidth};
pub use dai::{DaiFormat, DaiLink, StreamCapability};
pub use dapm::{PinSwitch, Route, RoutingTable, Widget, WidgetKind};
