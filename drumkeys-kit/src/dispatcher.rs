//! Input-to-playback dispatcher
//!
//! Resolves a key press to its bound clip and key element, restarts the clip
//! and lights the element. The light goes out when the element's own pulse
//! transition ends, through a `PulseReset` listener registered on every bound
//! element when the dispatcher is built.

use crate::binding::{Binding, BindingTable, ElementId, KeyCode, KitError};
use crate::element::{Board, KeyElement, StyleProperty, TransitionEnd, TransitionListener};
use std::collections::HashMap;

/// The property whose transition end clears the active state
pub const PULSE_PROPERTY: StyleProperty = StyleProperty::Transform;

/// A clip that can be restarted and played without waiting on the result
pub trait Playable {
    /// Move the playback position back to the start
    fn rewind(&self);
    /// Request playback from the current position
    fn play(&self);
}

/// A key-press signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
}

impl KeyPress {
    pub fn new(code: KeyCode) -> Self {
        Self { code }
    }
}

/// Clears the active state of one element when its pulse transition ends
#[derive(Debug, Clone, Copy)]
pub struct PulseReset {
    element: ElementId,
}

impl PulseReset {
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }
}

impl TransitionListener for PulseReset {
    fn on_transition_end(&mut self, event: &TransitionEnd, element: &mut KeyElement) {
        if event.element != self.element || event.property != PULSE_PROPERTY {
            return;
        }
        element.remove_active();
    }
}

struct Route<C> {
    clip: C,
    element: ElementId,
}

/// Maps key codes to (clip, element) pairs for the lifetime of the session
pub struct Dispatcher<C> {
    routes: HashMap<KeyCode, Route<C>>,
}

impl<C: Playable> Dispatcher<C> {
    /// Build the key code map from a binding table and register the pulse
    /// listener on each bound element of `board`
    pub fn new<F>(table: &BindingTable, board: &mut Board, mut clip_for: F) -> Result<Self, KitError>
    where
        F: FnMut(&Binding) -> C,
    {
        let mut routes = HashMap::with_capacity(table.len());

        for binding in table.iter() {
            board.add_listener(binding.element, Box::new(PulseReset::new(binding.element)))?;
            routes.insert(
                binding.code,
                Route {
                    clip: clip_for(binding),
                    element: binding.element,
                },
            );
        }

        Ok(Self { routes })
    }

    /// Restart the bound clip and light its element. Unbound codes are ignored.
    pub fn handle_key_press(&self, press: &KeyPress, board: &mut Board) {
        let Some(route) = self.routes.get(&press.code) else {
            tracing::trace!(code = press.code.value(), "unbound key");
            return;
        };

        route.clip.rewind();
        route.clip.play();

        if let Some(element) = board.element_mut(route.element) {
            element.add_active();
        }
    }

    pub fn is_bound(&self, code: KeyCode) -> bool {
        self.routes.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
