use crate::feature::Feature;
use crate::popup::{self, PopupSpec, PopupViewState};

/// Click-to-popup state machine.
///
/// Two states, mirroring the popup itself: `Hidden` (idle) and `Shown`
/// (open at a coordinate with formatted rows). Every click fully
/// replaces the previous state; `close` is always legal. The controller
/// holds the only mutable state in the whole pipeline, so the map
/// engine and the popup container never have to be real objects in
/// tests.
#[derive(Debug, Clone)]
pub struct PopupController {
    spec: PopupSpec,
    state: PopupViewState,
}

impl PopupController {
    pub fn new(spec: PopupSpec) -> Self {
        Self {
            spec,
            state: PopupViewState::Hidden,
        }
    }

    pub fn state(&self) -> &PopupViewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_shown()
    }

    /// Handles one pointer click. A feature hit opens (or re-opens) the
    /// popup with fresh content; a miss hides it.
    pub fn click(&mut self, feature: Option<&Feature>, coordinate: [f64; 2]) -> &PopupViewState {
        self.state = popup::format(feature, coordinate, &self.spec);
        &self.state
    }

    /// User-initiated dismissal. Always succeeds.
    pub fn close(&mut self) -> &PopupViewState {
        self.state = PopupViewState::Hidden;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::PopupField;
    use serde_json::json;

    fn controller() -> PopupController {
        PopupController::new(PopupSpec::new(
            "Información",
            vec![PopupField::new("Nombre", "nombre")],
        ))
    }

    fn feature(name: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "nombre": name },
            "geometry": null
        }))
        .unwrap()
    }

    #[test]
    fn starts_idle() {
        assert!(!controller().is_open());
    }

    #[test]
    fn click_scenario_sequence() {
        let mut ctl = controller();

        // Click with nothing under the pointer: stays hidden.
        ctl.click(None, [0.0, 0.0]);
        assert!(!ctl.is_open());

        // Feature hit: opens with that feature's rows.
        let f = feature("Camino X");
        let state = ctl.click(Some(&f), [1.0, 2.0]).clone();
        let PopupViewState::Shown { coordinate, rows } = state else {
            panic!("expected open popup");
        };
        assert_eq!(coordinate, [1.0, 2.0]);
        assert_eq!(rows[0].value, "Camino X");

        // Explicit close returns to idle.
        ctl.close();
        assert!(!ctl.is_open());
    }

    #[test]
    fn new_hit_replaces_open_popup() {
        let mut ctl = controller();
        ctl.click(Some(&feature("Primero")), [1.0, 1.0]);
        ctl.click(Some(&feature("Segundo")), [3.0, 4.0]);

        let PopupViewState::Shown { coordinate, rows } = ctl.state() else {
            panic!("expected open popup");
        };
        assert_eq!(*coordinate, [3.0, 4.0]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "Segundo");
    }

    #[test]
    fn miss_click_closes_open_popup() {
        let mut ctl = controller();
        ctl.click(Some(&feature("Camino X")), [1.0, 1.0]);
        assert!(ctl.is_open());
        ctl.click(None, [5.0, 5.0]);
        assert!(!ctl.is_open());
    }

    #[test]
    fn close_on_idle_is_a_noop() {
        let mut ctl = controller();
        ctl.close();
        assert_eq!(*ctl.state(), PopupViewState::Hidden);
    }

    #[test]
    fn open_iff_last_relevant_event_was_a_hit() {
        // Exercises an arbitrary event sequence against the invariant:
        // open exactly when the most recent hit was not followed by a
        // miss or a close.
        #[derive(Clone, Copy)]
        enum Event {
            Hit,
            Miss,
            Close,
        }
        use Event::*;

        let sequence = [Hit, Hit, Miss, Close, Hit, Close, Miss, Hit];
        let mut ctl = controller();
        let mut expect_open = false;
        let f = feature("Camino X");

        for event in sequence {
            match event {
                Hit => {
                    ctl.click(Some(&f), [0.0, 0.0]);
                    expect_open = true;
                }
                Miss => {
                    ctl.click(None, [0.0, 0.0]);
                    expect_open = false;
                }
                Close => {
                    ctl.close();
                    expect_open = false;
                }
            }
            assert_eq!(ctl.is_open(), expect_open);
        }
    }
}
