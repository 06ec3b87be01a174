//! UI Widgets for drumkeys

mod keyboard;
pub mod status_bar;

pub use keyboard::KeyboardWidget;
pub use status_bar::{HelpWidget, StatusBarWidget};
