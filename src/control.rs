//! Rotation state machine.
//!
//! `Controller` owns the enabled flag and the last orientation that was
//! pushed to the display. It reacts to two things only: the toggle file
//! changed, or the sensor has lines to read. Waiting for either is the
//! job of [`crate::daemon`].

use crate::backends::Dispatcher;
use crate::orientation::Orientation;
use crate::query::OrientationQuery;
use crate::sensors::OrientationEventSource;
use crate::toggle::ToggleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    /// Always a known orientation when set. Cleared on disable.
    pub last_applied: Option<Orientation>,
}

pub struct Controller<S, Q, D> {
    toggle: ToggleStore,
    source: S,
    query: Q,
    dispatcher: D,
    state: ControlState,
}

impl<S, Q, D> Controller<S, Q, D>
where
    S: OrientationEventSource,
    Q: OrientationQuery,
    D: Dispatcher,
{
    /// Loads the initial enabled state from the toggle file. Nothing is
    /// applied until the first orientation arrives.
    pub fn new(toggle: ToggleStore, source: S, query: Q, dispatcher: D) -> Self {
        let enabled = toggle.read();
        tracing::info!(enabled, path = %toggle.path().display(), "rotation toggle loaded");
        Controller {
            toggle,
            source,
            query,
            dispatcher,
            state: ControlState {
                enabled,
                last_applied: None,
            },
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn toggle(&self) -> &ToggleStore {
        &self.toggle
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Whether the sensor stream should be waited on right now.
    pub fn wants_sensor(&self) -> bool {
        self.state.enabled && !self.source.is_closed()
    }

    pub fn on_toggle_changed(&mut self) {
        let enabled = self.toggle.read();
        if enabled == self.state.enabled {
            return;
        }
        self.state.enabled = enabled;

        if enabled {
            let dropped = self.source.drain();
            tracing::info!(dropped, "rotation enabled");
            let current = self.query.query_current();
            if current.is_known() {
                self.apply_if_changed(current);
            } else {
                tracing::debug!("current orientation unknown, waiting for the sensor");
            }
        } else {
            // The device may be turned while disabled, so the next enable must
            // apply whatever it finds.
            self.state.last_applied = None;
            tracing::info!("rotation disabled");
        }
    }

    pub fn on_sensor_readable(&mut self) {
        if !self.state.enabled {
            return;
        }
        for line in self.source.read_available() {
            let orientation = Orientation::from_sensor_line(&line);
            tracing::trace!(%line, %orientation, "sensor line");
            self.apply_if_changed(orientation);
        }
    }

    /// Returns `true` if the dispatcher was invoked.
    fn apply_if_changed(&mut self, orientation: Orientation) -> bool {
        if self.state.last_applied == Some(orientation) {
            return false;
        }
        let transform = match orientation.transform() {
            Some(transform) => transform,
            None => return false,
        };
        tracing::info!(
            from = %self.state.last_applied.map_or("none", |o| o.keyword()),
            to = %orientation,
            "orientation changed"
        );
        self.dispatcher.apply(transform);
        self.state.last_applied = Some(orientation);
        true
    }
}
