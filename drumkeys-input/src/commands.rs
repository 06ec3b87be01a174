//! Command definitions for drumkeys

use drumkeys_kit::KeyCode;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Play,
    Help,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Play => "PLAY",
            Mode::Help => "HELP",
        }
    }
}

/// Commands that can be dispatched from input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// A key with this code went down (or auto-repeated)
    Press(KeyCode),

    // Audio
    AdjustVolume(f32),
    StopAll,

    // UI
    ToggleHelp,

    // Application
    Quit,
}
