//! The AIY Voice Bonnet sound card: probe and per-stream clock negotiation.
//!
//! ```text
//! probe(descriptor)
//!   ├─ compatible?             no  → ConfigurationError::Incompatible
//!   ├─ resolve codec           no  → ConfigurationError::UnresolvedReference
//!   ├─ resolve i2s controller  no  → ConfigurationError::UnresolvedReference
//!   ├─ InitSequencer (under the clock lock)
//!   └─ register with host      → AudioCard
//!
//! hw_params(params)   (any number of times, serialised by the clock lock)
//!   └─ ClockDomain::negotiate → ClockPlan | ClockError
//! ```
//!
//! Jack events never take the clock lock: the codec reports straight into
//! the [`Jack`], which has its own interrupt-safe state.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use heapless::String;
use platform::board_config::{
    CARD_NAME, CARD_NAME_CAPACITY, CODEC_REFERENCE_PROP, COMPATIBLE, DRIVER_NAME,
    I2S_REFERENCE_PROP, MODEL_PROP,
};
use platform::{
    BoardDescriptor, CardBinder, CardRegistration, Codec, DaiLink, HwParams, Jack, RoutingTable,
    StreamCapability,
};

use crate::clock::{ClockDomain, ClockPlan, ClockState};
use crate::dai_link::{voice_bonnet_link, STREAM_CAPABILITY};
use crate::error::{ClockError, ConfigurationError};
use crate::init::InitSequencer;
use crate::routing::VOICE_BONNET_ROUTING;

/// A bound, initialised and registered card.
///
/// `M` is the raw mutex guarding the codec's clock tree; pick
/// `CriticalSectionRawMutex` when stream opens can come from several
/// executors, `NoopRawMutex` when they share one.
pub struct AudioCard<M: RawMutex, C: Codec> {
    name: String<CARD_NAME_CAPACITY>,
    link: DaiLink,
    jack: &'static Jack,
    routing: &'static RoutingTable,
    clock: Mutex<M, ClockDomain<C>>,
}

/// Pick the card name: the model override if it fits, the default otherwise.
fn card_name(model: Option<&str>) -> String<CARD_NAME_CAPACITY> {
    let mut name = String::new();
    if let Some(model) = model {
        if name.push_str(model).is_ok() {
            return name;
        }
        tracing::warn!("{} '{}' too long, keeping {}", MODEL_PROP, model, CARD_NAME);
        name.clear();
    }
    // CARD_NAME is shorter than the buffer.
    let _ = name.push_str(CARD_NAME);
    name
}

/// Bind, initialise and register a card.
///
/// Both descriptor references must be present and resolve. Init runs once,
/// after binding and before the card is visible to the host; nothing is
/// registered if any step fails.
pub async fn probe<M, B>(
    descriptor: &BoardDescriptor<'_>,
    binder: &mut B,
) -> Result<AudioCard<M, B::Codec>, ConfigurationError<<B::Codec as Codec>::Error>>
where
    M: RawMutex,
    B: CardBinder,
{
    if descriptor.compatible != COMPATIBLE {
        tracing::error!("'{}' is not {}", descriptor.compatible, COMPATIBLE);
        return Err(ConfigurationError::Incompatible);
    }

    let codec = descriptor
        .codec_reference
        .and_then(|reference| binder.resolve_codec(reference))
        .ok_or_else(|| {
            tracing::error!("couldn't parse {}", CODEC_REFERENCE_PROP);
            ConfigurationError::UnresolvedReference(CODEC_REFERENCE_PROP)
        })?;

    let i2s = descriptor
        .i2s_reference
        .and_then(|reference| binder.resolve_dai(reference))
        .ok_or_else(|| {
            tracing::error!("couldn't parse {}", I2S_REFERENCE_PROP);
            ConfigurationError::UnresolvedReference(I2S_REFERENCE_PROP)
        })?;

    let link = voice_bonnet_link(i2s);
    let name = card_name(descriptor.model);

    let clock = Mutex::new(ClockDomain::new(codec));
    let jack = {
        let mut domain = clock.lock().await;
        InitSequencer::new(&mut *domain, &mut *binder).run().await?
    };

    binder
        .register_card(&CardRegistration {
            name: &name,
            dai_link: &link,
            routing: &VOICE_BONNET_ROUTING,
        })
        .map_err(|e| {
            tracing::error!("card registration failed: {}", e);
            ConfigurationError::Registration(e)
        })?;
    tracing::info!("{}: {} registered on {}", DRIVER_NAME, name.as_str(), link.cpu_dai);

    Ok(AudioCard {
        name,
        link,
        jack,
        routing: &VOICE_BONNET_ROUTING,
        clock,
    })
}

impl<M: RawMutex, C: Codec> AudioCard<M, C> {
    /// Negotiate codec clocks for a stream's hardware parameters.
    ///
    /// Concurrent callers are serialised; a failure affects only this
    /// stream open.
    pub async fn hw_params(&self, params: &HwParams) -> Result<ClockPlan, ClockError<C::Error>> {
        let mut domain = self.clock.lock().await;
        tracing::debug!(
            "hw_params: cpu={} codec={} rate={} width={}",
            self.link.cpu_dai,
            self.link.codec_dai,
            params.rate_hz,
            params.width.bits()
        );
        domain.negotiate(params).await
    }

    /// Recorded clock state. Waits for any negotiation in progress.
    pub async fn clock_state(&self) -> ClockState {
        self.clock.lock().await.state()
    }

    /// Card name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The card's DAI link.
    pub fn dai_link(&self) -> &DaiLink {
        &self.link
    }

    /// Declared stream limits.
    pub fn capability(&self) -> &'static StreamCapability {
        &STREAM_CAPABILITY
    }

    /// Widget / route / control catalogue.
    pub fn routing(&self) -> &'static RoutingTable {
        self.routing
    }

    /// Headphone jack state.
    pub fn jack(&self) -> &'static Jack {
        self.jack
    }

    /// Tear the card down and hand back the codec.
    pub fn into_codec(self) -> C {
        self.clock.into_inner().into_codec()
    }
}

impl<M: RawMutex, C: Codec> core::fmt::Debug for AudioCard<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioCard")
            .field("name", &self.name.as_str())
            .field("link", &self.link)
            .field("jack", &self.jack)
            .finish_non_exhaustive()
    }
}
