//! Audio engine for drumkeys - clip voices and master bus
//!
//! - Voice: one-shot playback of a clip slot, restarted rather than layered
//! - Mixer: master volume with smoothing and a soft clipper
//! - Engine: command/event channels between the UI thread and the audio thread

mod engine;
mod mixer;
mod voice;

pub use engine::{AudioCommand, AudioEngine, AudioEvent, ClipHandle, EngineState};
pub use mixer::Mixer;
pub use voice::{PlaybackState, Voice, VoiceState};
