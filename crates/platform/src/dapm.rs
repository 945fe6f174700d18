//! Power-domain catalogue types: widgets, routes and pin-switch controls.
//!
//! A [`RoutingTable`] is pure data. The card publishes it once at
//! registration; the external power-domain manager walks it to decide which
//! widgets to power for the active paths.

/// Board-level widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetKind {
    /// Headphone output.
    Headphone,
    /// Speaker output.
    Speaker,
    /// Microphone input.
    Microphone,
    /// Line input.
    Line,
}

impl WidgetKind {
    /// `true` for widgets that terminate an output path.
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Headphone | Self::Speaker)
    }
}

/// A board-level widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Widget {
    /// Widget name, unique within the card.
    pub name: &'static str,
    /// Widget kind.
    pub kind: WidgetKind,
}

/// A directed signal-path edge `source → sink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Route {
    /// Destination widget.
    pub sink: &'static str,
    /// Optional mixer/mux control gating the edge.
    pub control: Option<&'static str>,
    /// Origin widget.
    pub source: &'static str,
}

impl Route {
    /// An always-connected edge.
    pub const fn direct(sink: &'static str, source: &'static str) -> Self {
        Self {
            sink,
            control: None,
            source,
        }
    }
}

/// A user-toggleable switch forcing a widget pin on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSwitch {
    /// The widget pin the switch controls.
    pub pin: &'static str,
}

impl PinSwitch {
    /// Control name as shown to userspace: `"<pin> Switch"`.
    pub fn control_name(&self) -> heapless::String<48> {
        let mut name = heapless::String::new();
        // Pin names on this board are short; a truncated name is still unique.
        let _ = name.push_str(self.pin);
        let _ = name.push_str(" Switch");
        name
    }
}

/// Immutable widget / route / control catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoutingTable {
    /// Board widgets.
    pub widgets: &'static [Widget],
    /// Signal-path edges.
    pub routes: &'static [Route],
    /// Pin switches.
    pub controls: &'static [PinSwitch],
    /// Every codec pin not named in `routes` is treated as unconnected.
    pub fully_routed: bool,
}

impl RoutingTable {
    /// Look up a widget by name.
    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.name == name)
    }

    /// Edges feeding `sink`.
    pub fn routes_into<'a>(&'a self, sink: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |r| r.sink == sink)
    }

    /// Edges leaving `source`.
    pub fn routes_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |r| r.source == source)
    }
}
