//! Key bindings, key elements and the key-press dispatcher for drumkeys
//!
//! - Binding: key code → (clip, element) table, immutable after startup
//! - Element: key elements with an active state and animated style transitions
//! - Dispatcher: restarts the bound clip and pulses the bound element on a key press

mod binding;
mod dispatcher;
mod element;

pub use binding::{Binding, BindingTable, ClipId, ElementId, KeyCode, KitError, DEFAULT_KIT};
pub use dispatcher::{Dispatcher, KeyPress, Playable, PulseReset, PULSE_PROPERTY};
pub use element::{Board, KeyElement, StyleProperty, TransitionEnd, TransitionListener};
