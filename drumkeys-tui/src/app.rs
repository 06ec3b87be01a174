//! Application state management (Elm architecture)

use crate::theme::Theme;
use drumkeys_audio::{AudioEvent, VoiceState};
use drumkeys_input::Mode;
use drumkeys_kit::Board;
use std::time::{Duration, Instant};

/// How long info and success messages stay in the status bar
const MESSAGE_TTL: Duration = Duration::from_secs(3);
/// Warnings and errors linger a little longer
const ALERT_TTL: Duration = Duration::from_secs(6);

/// Message type for status bar coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Application state
pub struct AppState {
    /// Key pads and their running transitions
    pub board: Board,

    // Audio state (updated from audio engine)
    pub voices: Vec<VoiceState>,
    pub peak_level: f32,
    pub master_volume: f32,
    pub sample_rate: Option<u32>,

    // UI state
    pub mode: Mode,
    pub message: Option<String>,
    pub message_type: MessageType,
    message_expires: Option<Instant>,
    pub show_help: bool,

    // Theme
    pub theme: Theme,
}

impl AppState {
    pub fn new(board: Board, theme: Theme) -> Self {
        Self {
            board,
            voices: Vec::new(),
            peak_level: 0.0,
            master_volume: 1.0,
            sample_rate: None,
            mode: Mode::Play,
            message: None,
            message_type: MessageType::Info,
            message_expires: None,
            show_help: false,
            theme,
        }
    }

    /// Update state from audio engine event
    pub fn handle_audio_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Ready { sample_rate } => {
                self.sample_rate = Some(sample_rate);
            }
            AudioEvent::StateUpdate {
                voices,
                peak_level,
                master_volume,
            } => {
                self.voices = voices;
                self.peak_level = peak_level;
                self.master_volume = master_volume;
            }
            AudioEvent::Error(msg) => {
                self.set_error(format!("Audio: {}", msg));
            }
        }
    }

    /// Set current mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.show_help = mode == Mode::Help;
    }

    /// Set status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.show_message(msg.into(), MessageType::Info, MESSAGE_TTL);
    }

    /// Set success message
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.show_message(msg.into(), MessageType::Success, MESSAGE_TTL);
    }

    /// Set warning message
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.show_message(msg.into(), MessageType::Warning, ALERT_TTL);
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.show_message(msg.into(), MessageType::Error, ALERT_TTL);
    }

    fn show_message(&mut self, msg: String, message_type: MessageType, ttl: Duration) {
        self.message = Some(msg);
        self.message_type = message_type;
        self.message_expires = Some(Instant::now() + ttl);
    }

    /// Clear status message
    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = MessageType::Info;
        self.message_expires = None;
    }

    /// Drop the status message once its time is up
    pub fn expire_message(&mut self, now: Instant) {
        if self.message_expires.is_some_and(|at| now >= at) {
            self.clear_message();
        }
    }

    /// Set theme by name
    pub fn set_theme(&mut self, name: &str) {
        match Theme::by_name(name) {
            Some(theme) => self.theme = theme,
            None => self.set_warning(format!(
                "Unknown theme '{}' - using {}",
                name, self.theme.name
            )),
        }
    }

    /// Advance animations by one rendered frame
    pub fn tick(&mut self, elapsed: Duration) {
        self.board.tick(elapsed);
        self.expire_message(Instant::now());
    }
}

/// Main application wrapper
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{CLASSIC, CRT_AMBER};
    use drumkeys_audio::PlaybackState;
    use drumkeys_kit::{BindingTable, ElementId};

    fn state() -> AppState {
        let board = Board::from_table(&BindingTable::default_kit(), Board::DEFAULT_TRANSITION);
        AppState::new(board, CLASSIC)
    }

    #[test]
    fn test_state_update_copies_audio_state() {
        let mut state = state();
        state.handle_audio_event(AudioEvent::StateUpdate {
            voices: vec![
                VoiceState::default(),
                VoiceState {
                    playback: PlaybackState::Playing,
                    ..VoiceState::default()
                },
            ],
            peak_level: 0.4,
            master_volume: 0.8,
        });

        assert_eq!(state.master_volume, 0.8);
        assert_eq!(state.peak_level, 0.4);
        assert_eq!(state.voices.len(), 2);
        assert_eq!(state.voices[1].playback, PlaybackState::Playing);
    }

    #[test]
    fn test_audio_error_shown() {
        let mut state = state();
        state.handle_audio_event(AudioEvent::Error("no device".to_string()));
        assert_eq!(state.message_type, MessageType::Error);
        assert!(state.message.as_deref().unwrap().contains("no device"));
    }

    #[test]
    fn test_message_expires() {
        let mut state = state();
        state.set_message("hello");

        state.expire_message(Instant::now());
        assert!(state.message.is_some());

        state.expire_message(Instant::now() + MESSAGE_TTL + Duration::from_millis(1));
        assert!(state.message.is_none());
    }

    #[test]
    fn test_set_mode_tracks_help() {
        let mut state = state();
        state.set_mode(Mode::Help);
        assert!(state.show_help);
        assert_eq!(state.mode, Mode::Help);

        state.set_mode(Mode::Play);
        assert!(!state.show_help);
        assert_eq!(state.mode, Mode::Play);
    }

    #[test]
    fn test_set_theme() {
        let mut state = state();
        state.set_theme("amber");
        assert_eq!(state.theme.name, CRT_AMBER.name);

        state.set_theme("nope");
        assert_eq!(state.theme.name, CRT_AMBER.name);
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_tick_drives_board() {
        let mut state = state();
        if let Some(element) = state.board.element_mut(ElementId(0)) {
            element.add_active();
        }
        state.tick(Duration::from_millis(16));
        assert!(state.board.is_animating());
    }
}
