//! Keyboard input handling for drumkeys

mod commands;
mod keycodes;
mod modal;

pub use commands::{Command, Mode};
pub use keycodes::key_code_for;
pub use modal::InputHandler;
