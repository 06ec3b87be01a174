//! Modal state machine for keyboard input
//!
//! Almost every key is an instrument key, so the reserved controls sit on
//! keys a kit is unlikely to bind: Esc, F1, F2, the Up/Down arrows and
//! Ctrl+C / Ctrl+Q.

use crate::commands::{Command, Mode};
use crate::keycodes::key_code_for;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Master volume step for the arrow keys
const VOLUME_STEP: f32 = 0.05;

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
}

impl InputHandler {
    pub fn new() -> Self {
        Self { mode: Mode::Play }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        // Only presses and auto-repeat count, like keydown
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            return Some(Command::Quit);
        }

        match self.mode {
            Mode::Play => self.handle_play_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_play_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::F(1) => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }
            _ => Self::handle_shared(key),
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) => {
                self.mode = Mode::Play;
                Some(Command::ToggleHelp)
            }
            // Pads stay playable under the help overlay
            _ => Self::handle_shared(key),
        }
    }

    fn handle_shared(key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Up => Some(Command::AdjustVolume(VOLUME_STEP)),
            KeyCode::Down => Some(Command::AdjustVolume(-VOLUME_STEP)),
            KeyCode::F(2) => Some(Command::StopAll),
            _ => key_code_for(&key).map(Command::Press),
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drumkeys_kit::KeyCode as Code;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_letter_becomes_press() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.handle_key(press(KeyCode::Char('a'))),
            Some(Command::Press(Code(65)))
        );
    }

    #[test]
    fn test_repeat_counts_release_does_not() {
        let mut input = InputHandler::new();
        let repeat =
            KeyEvent::new_with_kind(KeyCode::Char('s'), KeyModifiers::NONE, KeyEventKind::Repeat);
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('s'), KeyModifiers::NONE, KeyEventKind::Release);

        assert_eq!(input.handle_key(repeat), Some(Command::Press(Code(83))));
        assert_eq!(input.handle_key(release), None);
    }

    #[test]
    fn test_quit_keys() {
        let mut input = InputHandler::new();
        assert_eq!(input.handle_key(press(KeyCode::Esc)), Some(Command::Quit));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_help_mode_round_trip() {
        let mut input = InputHandler::new();

        assert_eq!(input.handle_key(press(KeyCode::F(1))), Some(Command::ToggleHelp));
        assert_eq!(input.mode(), Mode::Help);

        // Esc closes help instead of quitting
        assert_eq!(input.handle_key(press(KeyCode::Esc)), Some(Command::ToggleHelp));
        assert_eq!(input.mode(), Mode::Play);
    }

    #[test]
    fn test_pads_playable_in_help() {
        let mut input = InputHandler::new();
        input.handle_key(press(KeyCode::F(1)));
        assert_eq!(
            input.handle_key(press(KeyCode::Char('k'))),
            Some(Command::Press(Code(75)))
        );
    }

    #[test]
    fn test_volume_and_stop() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.handle_key(press(KeyCode::Up)),
            Some(Command::AdjustVolume(VOLUME_STEP))
        );
        assert_eq!(
            input.handle_key(press(KeyCode::Down)),
            Some(Command::AdjustVolume(-VOLUME_STEP))
        );
        assert_eq!(input.handle_key(press(KeyCode::F(2))), Some(Command::StopAll));
    }

    #[test]
    fn test_unmapped_terminal_key_yields_nothing() {
        let mut input = InputHandler::new();
        assert_eq!(input.handle_key(press(KeyCode::Null)), None);
    }

    #[test]
    fn test_modifier_key_is_a_press() {
        let mut input = InputHandler::new();
        let shift = press(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift));
        assert_eq!(input.handle_key(shift), Some(Command::Press(Code(16))));
    }
}
