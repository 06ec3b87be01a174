//! Terminal UI for drumkeys - pads, themes, and layout

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, MessageType};
pub use theme::{blend, Theme, CLASSIC, CRT_AMBER, CRT_GREEN};
pub use widgets::{HelpWidget, KeyboardWidget, StatusBarWidget};
