//! Audio engine - orchestrates clip voices and the master bus

use crate::mixer::Mixer;
use crate::voice::{Voice, VoiceState};
use crossbeam_channel::{bounded, Receiver, Sender};
use drumkeys_kit::{ClipId, Playable};
use std::sync::Arc;

/// Commands sent to the audio engine
#[derive(Debug, Clone)]
pub enum AudioCommand {
    // Clip slot commands (samples are interleaved stereo at the engine rate)
    // Using Arc to avoid copying sample data through channels
    LoadClip(ClipId, Arc<Vec<f32>>, Option<String>),
    Rewind(ClipId),
    Play(ClipId),
    StopAll,

    // Master bus
    SetMasterVolume(f32),
    AdjustMasterVolume(f32),

    // System
    Shutdown,
}

/// Events sent from the audio engine
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// Output stream is running at this sample rate
    Ready { sample_rate: u32 },
    /// State update for UI rendering
    StateUpdate {
        voices: Vec<VoiceState>,
        peak_level: f32,
        master_volume: f32,
    },
    /// Error occurred
    Error(String),
}

/// Maximum buffer size for the pre-allocated mix buffer
/// Sized for 2048 stereo frames (typical maximum)
const MAX_BUFFER_SIZE: usize = 4096;

/// Audio engine state (held in audio thread)
pub struct EngineState {
    voices: Vec<Voice>,
    pub mixer: Mixer,
    sample_rate: u32,
    /// Smoothed output peak for metering
    peak_level: f32,
    // Pre-allocated scratch buffer (avoids allocation in audio callback)
    mix_buffer: Vec<f32>,
}

impl EngineState {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_slots(sample_rate, 0)
    }

    /// Engine with `slots` empty voices, one per bound clip
    pub fn with_slots(sample_rate: u32, slots: usize) -> Self {
        Self {
            voices: (0..slots).map(|_| Voice::new(sample_rate)).collect(),
            mixer: Mixer::new(),
            sample_rate,
            peak_level: 0.0,
            mix_buffer: vec![0.0f32; MAX_BUFFER_SIZE],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn voice(&self, clip: ClipId) -> Option<&Voice> {
        self.voices.get(clip.0)
    }

    /// Process a command
    pub fn handle_command(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::LoadClip(clip, samples, name) => {
                tracing::debug!(clip = clip.0, frames = samples.len() / 2, "clip loaded");
                self.slot_mut(clip).load(samples, name);
            }
            AudioCommand::Rewind(clip) => {
                if let Some(voice) = self.voices.get_mut(clip.0) {
                    voice.rewind();
                }
            }
            AudioCommand::Play(clip) => {
                self.play(clip);
            }
            AudioCommand::StopAll => self.voices.iter_mut().for_each(Voice::stop),
            AudioCommand::SetMasterVolume(vol) => self.mixer.set_master_volume(vol),
            AudioCommand::AdjustMasterVolume(delta) => self.mixer.adjust_master_volume(delta),
            // Handled by the command loop
            AudioCommand::Shutdown => {}
        }
    }

    /// Voice for `clip`, growing the slot list if it is out of range
    fn slot_mut(&mut self, clip: ClipId) -> &mut Voice {
        if self.voices.len() <= clip.0 {
            let sample_rate = self.sample_rate;
            self.voices.resize_with(clip.0 + 1, || Voice::new(sample_rate));
        }
        &mut self.voices[clip.0]
    }

    /// Start a clip. Returns true when an empty slot was reported.
    fn play(&mut self, clip: ClipId) -> bool {
        let voice = self.slot_mut(clip);
        if voice.play() || !voice.report_empty_once() {
            return false;
        }
        tracing::warn!(clip = clip.0, "play requested for an empty clip slot");
        true
    }

    /// Render the next block into an interleaved stereo buffer
    pub fn process(&mut self, output: &mut [f32]) {
        let len = output.len().min(self.mix_buffer.len());
        let mix = &mut self.mix_buffer[..len];
        mix.fill(0.0);

        for voice in self.voices.iter_mut() {
            voice.mix_into(mix);
        }

        self.mixer.process(mix);

        let current_peak = mix.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        self.peak_level = self.peak_level.max(current_peak) * 0.95 + current_peak * 0.05;

        output[..len].copy_from_slice(mix);
        // Blocks larger than the scratch buffer get silence for the excess
        output[len..].fill(0.0);
    }

    /// Snapshot for the UI
    pub fn get_state(&self) -> AudioEvent {
        AudioEvent::StateUpdate {
            voices: self.voices.iter().map(Voice::state).collect(),
            peak_level: self.peak_level,
            master_volume: self.mixer.master_volume(),
        }
    }
}

/// Handle to communicate with the audio engine
pub struct AudioEngine {
    /// Send commands to audio thread
    pub command_tx: Sender<AudioCommand>,
    /// Receive events from audio thread
    pub event_rx: Receiver<AudioEvent>,
}

impl AudioEngine {
    /// Create channels for engine communication
    /// Buffer size of 1024 provides headroom for key-repeat bursts without saturation
    pub fn create_channels() -> (
        Sender<AudioCommand>,
        Receiver<AudioCommand>,
        Sender<AudioEvent>,
        Receiver<AudioEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(1024);
        let (evt_tx, evt_rx) = bounded(1024);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(command_tx: Sender<AudioCommand>, event_rx: Receiver<AudioEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Send a command to the audio engine without waiting
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.command_tx.try_send(cmd);
    }

    /// Playable handle for one clip slot
    pub fn clip(&self, clip: ClipId) -> ClipHandle {
        ClipHandle {
            clip,
            command_tx: self.command_tx.clone(),
        }
    }

    /// Ask the audio thread to stop its command loop
    pub fn shutdown(&self) {
        self.send(AudioCommand::Shutdown);
    }
}

/// Fire-and-forget playback handle for one clip slot
#[derive(Debug, Clone)]
pub struct ClipHandle {
    clip: ClipId,
    command_tx: Sender<AudioCommand>,
}

impl Playable for ClipHandle {
    fn rewind(&self) {
        let _ = self.command_tx.try_send(AudioCommand::Rewind(self.clip));
    }

    fn play(&self) {
        let _ = self.command_tx.try_send(AudioCommand::Play(self.clip));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: usize, value: f32) -> Arc<Vec<f32>> {
        Arc::new(vec![value; frames * 2])
    }

    fn playing(state: &EngineState, id: usize) -> bool {
        state.voice(ClipId(id)).map_or(false, Voice::is_playing)
    }

    #[test]
    fn test_load_grows_slots() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::LoadClip(ClipId(2), clip(10, 0.1), None));

        assert!(state.voice(ClipId(0)).is_some());
        assert!(!state.voice(ClipId(0)).unwrap().is_loaded());
        assert!(state.voice(ClipId(2)).unwrap().is_loaded());
    }

    #[test]
    fn test_rewind_then_play_restarts_single_voice() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::LoadClip(ClipId(0), clip(1000, 0.25), None));
        state.handle_command(AudioCommand::Rewind(ClipId(0)));
        state.handle_command(AudioCommand::Play(ClipId(0)));

        let mut out = vec![0.0; 200];
        state.process(&mut out);
        assert_eq!(state.voice(ClipId(0)).unwrap().position_frames(), 100);

        state.handle_command(AudioCommand::Rewind(ClipId(0)));
        state.handle_command(AudioCommand::Play(ClipId(0)));
        assert_eq!(state.voice(ClipId(0)).unwrap().position_frames(), 0);

        // One voice at 0.25, not two layered copies at 0.5
        let mut out = vec![0.0; 4];
        state.process(&mut out);
        assert!(out.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_voices_sum() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::LoadClip(ClipId(0), clip(10, 0.25), None));
        state.handle_command(AudioCommand::LoadClip(ClipId(1), clip(10, 0.25), None));
        state.handle_command(AudioCommand::Play(ClipId(0)));
        state.handle_command(AudioCommand::Play(ClipId(1)));

        let mut out = vec![0.0; 4];
        state.process(&mut out);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_with_slots_reserves_empty_voices() {
        let state = EngineState::with_slots(48000, 3);
        assert!(state.voice(ClipId(2)).is_some_and(|v| !v.is_loaded()));
        assert!(state.voice(ClipId(3)).is_none());
        match state.get_state() {
            AudioEvent::StateUpdate { voices, .. } => assert_eq!(voices.len(), 3),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_missing_trailing_slot_reported_once() {
        let mut state = EngineState::with_slots(48000, 9);
        for id in 0..8 {
            state.handle_command(AudioCommand::LoadClip(ClipId(id), clip(10, 0.1), None));
        }

        assert!(state.play(ClipId(8)));
        assert!(!state.play(ClipId(8)));
        // Beyond the reserved slots behaves the same
        assert!(state.play(ClipId(12)));
        assert!(!state.play(ClipId(12)));
        assert!(!state.play(ClipId(0)));
    }

    #[test]
    fn test_reload_reports_empty_again() {
        let mut state = EngineState::with_slots(48000, 1);
        assert!(state.play(ClipId(0)));
        state.handle_command(AudioCommand::LoadClip(ClipId(0), Arc::new(Vec::new()), None));
        assert!(state.play(ClipId(0)));
    }

    #[test]
    fn test_play_on_missing_slot_is_harmless() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::Play(ClipId(5)));
        state.handle_command(AudioCommand::Rewind(ClipId(5)));

        let mut out = vec![1.0; 8];
        state.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stop_all() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::LoadClip(ClipId(0), clip(10, 0.25), None));
        state.handle_command(AudioCommand::Play(ClipId(0)));
        assert!(playing(&state, 0));

        state.handle_command(AudioCommand::StopAll);
        assert!(!playing(&state, 0));
    }

    #[test]
    fn test_oversized_block_is_silenced() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::LoadClip(ClipId(0), clip(10_000, 0.25), None));
        state.handle_command(AudioCommand::Play(ClipId(0)));

        let mut out = vec![1.0; MAX_BUFFER_SIZE + 8];
        state.process(&mut out);
        assert!(out[MAX_BUFFER_SIZE..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_state_update_reports_volume() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::SetMasterVolume(0.5));
        state.handle_command(AudioCommand::AdjustMasterVolume(0.25));

        match state.get_state() {
            AudioEvent::StateUpdate { master_volume, .. } => assert_eq!(master_volume, 0.75),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_clip_handle_sends_commands() {
        let (cmd_tx, cmd_rx, _evt_tx, evt_rx) = AudioEngine::create_channels();
        let engine = AudioEngine::new(cmd_tx, evt_rx);
        let handle = engine.clip(ClipId(3));

        handle.rewind();
        handle.play();

        assert!(matches!(cmd_rx.try_recv(), Ok(AudioCommand::Rewind(ClipId(3)))));
        assert!(matches!(cmd_rx.try_recv(), Ok(AudioCommand::Play(ClipId(3)))));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn test_shutdown_sends_command() {
        let (cmd_tx, cmd_rx, _evt_tx, evt_rx) = AudioEngine::create_channels();
        AudioEngine::new(cmd_tx, evt_rx).shutdown();
        assert!(matches!(cmd_rx.try_recv(), Ok(AudioCommand::Shutdown)));
    }
}
