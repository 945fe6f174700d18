//! Headphone detection from the codec's IRQ line.
//!
//! Once jack detection is enabled the RT5645 drives its GPIO1/IRQ output
//! with the jack-detect level. This monitor waits for edges on the host
//! GPIO wired to that output and reports headphone presence straight into
//! the jack. It never touches the codec bus or the card's clock lock, so a
//! negotiation in progress cannot delay an insertion event.

use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use platform::{JackEvent, JackSink, JackType};

/// Forwards IRQ line levels to a jack.
pub struct JackIrqMonitor<P> {
    pin: P,
    jack: &'static dyn JackSink,
    inserted_level_high: bool,
}

impl<P> JackIrqMonitor<P>
where
    P: InputPin + Wait,
{
    /// Monitor `pin`. `inserted_level_high` is the line level meaning
    /// "headphone present".
    pub fn new(pin: P, jack: &'static dyn JackSink, inserted_level_high: bool) -> Self {
        Self {
            pin,
            jack,
            inserted_level_high,
        }
    }

    /// Read the line once and report it. Returns `true` if inserted.
    pub fn sample(&mut self) -> Result<bool, P::Error> {
        let inserted = self.pin.is_high()? == self.inserted_level_high;
        self.jack.report(JackEvent {
            status: if inserted {
                JackType::HEADPHONE
            } else {
                JackType::empty()
            },
            mask: JackType::HEADPHONE,
        });
        tracing::debug!("headphone {}", if inserted { "inserted" } else { "removed" });
        Ok(inserted)
    }

    /// Report the current level, then every change, until the pin errors.
    pub async fn run(&mut self) -> Result<core::convert::Infallible, P::Error> {
        self.sample()?;
        loop {
            self.pin.wait_for_any_edge().await?;
            self.sample()?;
        }
    }

    /// Release the pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}
