//! Card binding: the host services a card driver consumes at probe time.
//!
//! Resolution of hardware-description references into device handles, jack
//! input-device allocation and card registration all belong to the host. The
//! card sees them only through [`CardBinder`].

use thiserror_no_std::Error;

use crate::codec::Codec;
use crate::dai::DaiLink;
use crate::dapm::RoutingTable;
use crate::jack::{Jack, JackAllocError, JackPin, JackType};

/// Hardware-description inputs for one board instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardDescriptor<'a> {
    /// Compatible string the host matched on.
    pub compatible: &'a str,
    /// Reference to the codec endpoint, if the property is present.
    pub codec_reference: Option<&'a str>,
    /// Reference to the I2S controller, if the property is present.
    pub i2s_reference: Option<&'a str>,
    /// Optional card model name.
    pub model: Option<&'a str>,
}

/// A resolved CPU-side DAI endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiEndpoint {
    /// DAI name as registered with the host.
    pub name: &'static str,
}

/// What the card hands to the host when publishing itself.
#[derive(Debug, Clone, Copy)]
pub struct CardRegistration<'a> {
    /// Card name.
    pub name: &'a str,
    /// The card's only DAI link.
    pub dai_link: &'a DaiLink,
    /// Catalogue for the power-domain manager.
    pub routing: &'a RoutingTable,
}

/// Card registration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    /// A card with the same name is already registered.
    #[error("card name already registered")]
    NameInUse,
    /// A component the card depends on has not probed yet.
    #[error("dependency not ready, probe deferred")]
    Deferred,
    /// The host rejected the routing catalogue.
    #[error("routing catalogue rejected")]
    InvalidRouting,
}

/// Host services used while probing a card.
pub trait CardBinder {
    /// Codec driver type produced by resolution.
    type Codec: Codec;

    /// Resolve the codec endpoint reference.
    fn resolve_codec(&mut self, reference: &str) -> Option<Self::Codec>;

    /// Resolve the CPU-side DAI reference.
    fn resolve_dai(&mut self, reference: &str) -> Option<DaiEndpoint>;

    /// Allocate a jack input device bound to `pin`.
    fn new_jack(
        &mut self,
        name: &'static str,
        types: JackType,
        pin: JackPin,
    ) -> Result<&'static Jack, JackAllocError>;

    /// Publish a fully initialised card.
    fn register_card(&mut self, card: &CardRegistration<'_>) -> Result<(), RegistrationError>;
}
