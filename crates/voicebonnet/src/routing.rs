//! The bonnet's widget / route / control catalogue.
//!
//! Three board widgets, eight edges into the RT5645's pins, three pin
//! switches. The microphone bias edge appears twice; the power-domain
//! manager tolerates duplicate edges and the catalogue is kept as shipped.

use platform::{PinSwitch, Route, RoutingTable, Widget, WidgetKind};

/// Headphone output widget.
pub const HEADPHONE: &str = "Headphone";
/// Speaker output widget.
pub const SPEAKER: &str = "Speaker";
/// Internal microphone widget.
pub const INT_MIC: &str = "Int Mic";

const WIDGETS: &[Widget] = &[
    Widget {
        name: HEADPHONE,
        kind: WidgetKind::Headphone,
    },
    Widget {
        name: SPEAKER,
        kind: WidgetKind::Speaker,
    },
    Widget {
        name: INT_MIC,
        kind: WidgetKind::Microphone,
    },
];

const ROUTES: &[Route] = &[
    Route::direct("micbias2", INT_MIC),
    Route::direct("micbias2", INT_MIC),
    Route::direct("IN1P", "micbias2"),
    Route::direct("IN2P", "micbias2"),
    Route::direct(HEADPHONE, "HPOR"),
    Route::direct(HEADPHONE, "HPOL"),
    Route::direct(SPEAKER, "SPOL"),
    Route::direct(SPEAKER, "SPOR"),
];

const CONTROLS: &[PinSwitch] = &[
    PinSwitch { pin: HEADPHONE },
    PinSwitch { pin: SPEAKER },
    PinSwitch { pin: INT_MIC },
];

/// The catalogue published at card registration.
pub static VOICE_BONNET_ROUTING: RoutingTable = RoutingTable {
    widgets: WIDGETS,
    routes: ROUTES,
    controls: CONTROLS,
    fully_routed: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_sizes() {
        assert_eq!(VOICE_BONNET_ROUTING.widgets.len(), 3);
        assert_eq!(VOICE_BONNET_ROUTING.routes.len(), 8);
        assert_eq!(VOICE_BONNET_ROUTING.controls.len(), 3);
        assert!(VOICE_BONNET_ROUTING.fully_routed);
    }

    #[test]
    fn every_control_switches_a_board_widget() {
        for control in VOICE_BONNET_ROUTING.controls {
            assert!(
                VOICE_BONNET_ROUTING.widget(control.pin).is_some(),
                "{} has no widget",
                control.pin
            );
        }
    }

    #[test]
    fn outputs_are_fed_from_both_codec_channels() {
        let hp: Vec<_> = VOICE_BONNET_ROUTING
            .routes_into(HEADPHONE)
            .map(|r| r.source)
            .collect();
        assert_eq!(hp, ["HPOR", "HPOL"]);
        let spk: Vec<_> = VOICE_BONNET_ROUTING
            .routes_into(SPEAKER)
            .map(|r| r.source)
            .collect();
        assert_eq!(spk, ["SPOL", "SPOR"]);
    }

    #[test]
    fn mic_bias_feeds_both_inputs() {
        let sinks: Vec<_> = VOICE_BONNET_ROUTING
            .routes_from("micbias2")
            .map(|r| r.sink)
            .collect();
        assert_eq!(sinks, ["IN1P", "IN2P"]);
    }

    #[test]
    fn no_edge_is_gated_by_a_control() {
        assert!(VOICE_BONNET_ROUTING.routes.iter().all(|r| r.control.is_none()));
    }
}
