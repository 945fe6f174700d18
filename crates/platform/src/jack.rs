//! Jack detection state.
//!
//! A [`Jack`] is the small state record the codec's detection interrupt
//! updates. It is written from interrupt context through [`JackSink`] and read
//! by the card and by power-domain observers, so it lives behind a
//! `CriticalSectionRawMutex` and never behind the card's clock lock.
//!
//! ```text
//! codec IRQ ──report()──▶ Jack { status, pin_enabled } ──Signal──▶ wait_changed()
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use static_cell::StaticCell;
use thiserror_no_std::Error;

// ── JackType ─────────────────────────────────────────────────────────────────

/// Reportable jack switch types, as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct JackType(u32);

impl JackType {
    /// Headphone presence.
    pub const HEADPHONE: Self = Self(0x0001);
    /// Microphone presence.
    pub const MICROPHONE: Self = Self(0x0002);
    /// Headset: headphone and microphone.
    pub const HEADSET: Self = Self(0x0003);
    /// Line-out presence.
    pub const LINEOUT: Self = Self(0x0004);
    /// Mechanical switch.
    pub const MECHANICAL: Self = Self(0x0008);
    /// Video-out presence.
    pub const VIDEOOUT: Self = Self(0x0010);
    /// Audio/video out: line-out and video-out.
    pub const AVOUT: Self = Self(0x0014);
    /// Line-in presence.
    pub const LINEIN: Self = Self(0x0020);
    /// Headset button 0.
    pub const BTN_0: Self = Self(0x4000);
    /// Headset button 1.
    pub const BTN_1: Self = Self(0x2000);
    /// Headset button 2.
    pub const BTN_2: Self = Self(0x1000);
    /// Headset button 3.
    pub const BTN_3: Self = Self(0x0800);
    /// Headset button 4.
    pub const BTN_4: Self = Self(0x0400);
    /// Headset button 5.
    pub const BTN_5: Self = Self(0x0200);

    /// Wrap a raw mask.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Empty mask.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// `true` if no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Bits set in both masks.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Bits set in either mask.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bits of `self` not set in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl core::ops::BitOr for JackType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ── JackPin / JackEvent / JackReport ─────────────────────────────────────────

/// A power-domain pin whose enable state follows the jack status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JackPin {
    /// Widget name of the pin.
    pub pin: &'static str,
    /// Status bits that enable the pin.
    pub mask: JackType,
    /// Enable the pin when the masked status is clear instead of set.
    pub invert: bool,
}

impl JackPin {
    /// Enable state of this pin for a given jack status.
    pub const fn enabled_for(&self, status: JackType) -> bool {
        status.intersects(self.mask) != self.invert
    }
}

/// A detection event emitted by the codec layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JackEvent {
    /// New values for the bits in `mask`.
    pub status: JackType,
    /// Bits this event is authoritative for.
    pub mask: JackType,
}

/// Snapshot of a jack's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JackReport {
    /// Current switch status.
    pub status: JackType,
    /// Whether the bound pin is currently enabled.
    pub pin_enabled: bool,
}

/// Receiver of jack detection events.
///
/// Implementations must be callable from interrupt context.
pub trait JackSink: Sync {
    /// Apply a detection event.
    fn report(&self, event: JackEvent);
}

// ── Jack ─────────────────────────────────────────────────────────────────────

/// Jack detection object bound to exactly one pin.
pub struct Jack {
    name: &'static str,
    types: JackType,
    pin: JackPin,
    state: Mutex<CriticalSectionRawMutex, Cell<JackReport>>,
    changed: Signal<CriticalSectionRawMutex, JackReport>,
}

impl Jack {
    /// Create a jack with nothing inserted.
    pub const fn new(name: &'static str, types: JackType, pin: JackPin) -> Self {
        Self {
            name,
            types,
            pin,
            state: Mutex::new(Cell::new(JackReport {
                status: JackType::empty(),
                pin_enabled: pin.enabled_for(JackType::empty()),
            })),
            changed: Signal::new(),
        }
    }

    /// Jack name as exposed to userspace.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Switch types this jack can report.
    pub fn types(&self) -> JackType {
        self.types
    }

    /// The pin bound to this jack.
    pub fn pin(&self) -> &JackPin {
        &self.pin
    }

    /// Current state snapshot.
    pub fn current(&self) -> JackReport {
        self.state.lock(Cell::get)
    }

    /// Current switch status.
    pub fn status(&self) -> JackType {
        self.current().status
    }

    /// Whether the bound pin is enabled.
    pub fn pin_enabled(&self) -> bool {
        self.current().pin_enabled
    }

    /// Wait for the next state change.
    pub async fn wait_changed(&self) -> JackReport {
        self.changed.wait().await
    }

    fn apply(&self, event: JackEvent) -> JackReport {
        let mask = event.mask.intersection(self.types.union(self.pin.mask));
        self.state.lock(|cell| {
            let old = cell.get();
            let status = old
                .status
                .difference(mask)
                .union(event.status.intersection(mask));
            let report = JackReport {
                status,
                pin_enabled: self.pin.enabled_for(status),
            };
            cell.set(report);
            report
        })
    }
}

impl JackSink for Jack {
    fn report(&self, event: JackEvent) {
        let report = self.apply(event);
        self.changed.signal(report);
    }
}

impl core::fmt::Debug for Jack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Jack")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("pin", &self.pin)
            .field("state", &self.current())
            .finish_non_exhaustive()
    }
}

// ── Allocation ───────────────────────────────────────────────────────────────

/// Jack allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JackAllocError {
    /// The backing storage already holds a jack.
    #[error("jack storage already allocated")]
    AlreadyAllocated,
    /// The host could not register the jack's input device.
    #[error("host refused jack registration")]
    HostRefused,
}

/// Static storage for one jack, for hosts without an allocator.
///
/// ```rust
/// use platform::jack::{JackPin, JackSlot, JackType};
///
/// static HEADPHONE: JackSlot = JackSlot::new();
///
/// let pin = JackPin { pin: "Headphone", mask: JackType::from_bits(0xF_FFFF), invert: false };
/// let jack = HEADPHONE.allocate("Headphone Jack", JackType::HEADPHONE, pin).unwrap();
/// assert_eq!(jack.name(), "Headphone Jack");
/// ```
pub struct JackSlot {
    cell: StaticCell<Jack>,
}

impl JackSlot {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: StaticCell::new(),
        }
    }

    /// Place a new jack into the slot.
    ///
    /// # Errors
    ///
    /// [`JackAllocError::AlreadyAllocated`] if the slot was used before.
    pub fn allocate(
        &'static self,
        name: &'static str,
        types: JackType,
        pin: JackPin,
    ) -> Result<&'static Jack, JackAllocError> {
        self.cell
            .try_init(Jack::new(name, types, pin))
            .map(|jack| &*jack)
            .ok_or(JackAllocError::AlreadyAllocated)
    }
}

impl Default for JackSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HP_PIN: JackPin = JackPin {
        pin: "Headphone",
        mask: JackType::from_bits(0xF_FFFF),
        invert: false,
    };

    fn headphone_jack() -> Jack {
        Jack::new("Headphone Jack", JackType::HEADPHONE, HP_PIN)
    }

    #[test]
    fn jack_starts_empty_with_pin_disabled() {
        let jack = headphone_jack();
        assert!(jack.status().is_empty());
        assert!(!jack.pin_enabled());
    }

    #[test]
    fn insertion_enables_pin() {
        let jack = headphone_jack();
        jack.report(JackEvent {
            status: JackType::HEADPHONE,
            mask: JackType::HEADPHONE,
        });
        assert_eq!(jack.status(), JackType::HEADPHONE);
        assert!(jack.pin_enabled());
    }

    #[test]
    fn removal_disables_pin() {
        let jack = headphone_jack();
        jack.report(JackEvent {
            status: JackType::HEADPHONE,
            mask: JackType::HEADPHONE,
        });
        jack.report(JackEvent {
            status: JackType::empty(),
            mask: JackType::HEADPHONE,
        });
        assert!(jack.status().is_empty());
        assert!(!jack.pin_enabled());
    }

    #[test]
    fn bits_outside_event_mask_are_kept() {
        let jack = headphone_jack();
        jack.report(JackEvent {
            status: JackType::HEADPHONE | JackType::BTN_0,
            mask: JackType::HEADPHONE | JackType::BTN_0,
        });
        jack.report(JackEvent {
            status: JackType::empty(),
            mask: JackType::BTN_0,
        });
        assert_eq!(jack.status(), JackType::HEADPHONE);
    }

    #[test]
    fn inverted_pin_enabled_when_empty() {
        let pin = JackPin {
            invert: true,
            ..HP_PIN
        };
        let jack = Jack::new("Speaker Mute", JackType::HEADPHONE, pin);
        assert!(jack.pin_enabled());
        jack.report(JackEvent {
            status: JackType::HEADPHONE,
            mask: JackType::HEADPHONE,
        });
        assert!(!jack.pin_enabled());
    }

    #[tokio::test]
    async fn report_wakes_waiter() {
        let jack = headphone_jack();
        jack.report(JackEvent {
            status: JackType::HEADPHONE,
            mask: JackType::HEADPHONE,
        });
        let report = jack.wait_changed().await;
        assert!(report.pin_enabled);
        assert_eq!(report.status, JackType::HEADPHONE);
    }

    #[test]
    fn slot_allocates_once() {
        static SLOT: JackSlot = JackSlot::new();
        let first = SLOT.allocate("Headphone Jack", JackType::HEADPHONE, HP_PIN);
        assert!(first.is_ok());
        let second = SLOT.allocate("Headphone Jack", JackType::HEADPHONE, HP_PIN);
        assert_eq!(second.unwrap_err(), JackAllocError::AlreadyAllocated);
    }
}
