//! Voice - one-shot playback of a single clip slot

use std::sync::Arc;

/// Playback state of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Snapshot of a voice for UI rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceState {
    pub playback: PlaybackState,
    pub name: Option<String>,
    /// Position in seconds
    pub position: f64,
    /// Clip length in seconds
    pub duration: f64,
}

/// Plays one clip from its current position to the end
///
/// There is exactly one voice per clip slot, so triggering a clip that is
/// already sounding moves the same voice back to the start instead of
/// layering a second copy.
pub struct Voice {
    /// Interleaved stereo samples at the engine rate - Arc to avoid copying through channels
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    name: Option<String>,
    /// Playback position in frames
    position: usize,
    state: PlaybackState,
    /// Set once a trigger on an empty slot has been reported
    reported_empty: bool,
}

impl Voice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(Vec::new()),
            sample_rate,
            name: None,
            position: 0,
            state: PlaybackState::Stopped,
            reported_empty: false,
        }
    }

    /// Load interleaved stereo samples, replacing any previous clip
    pub fn load(&mut self, samples: Arc<Vec<f32>>, name: Option<String>) {
        self.samples = samples;
        self.name = name;
        self.position = 0;
        self.state = PlaybackState::Stopped;
        self.reported_empty = false;
    }

    pub fn is_loaded(&self) -> bool {
        !self.samples.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Move back to the first frame, whether playing or not
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Start playback from the current position. Returns false if no clip is loaded.
    pub fn play(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position = 0;
    }

    /// Position in frames
    pub fn position_frames(&self) -> usize {
        self.position
    }

    pub fn len_frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Mark the empty slot as reported; returns true the first time only
    pub(crate) fn report_empty_once(&mut self) -> bool {
        !std::mem::replace(&mut self.reported_empty, true)
    }

    pub fn state(&self) -> VoiceState {
        let rate = self.sample_rate.max(1) as f64;
        VoiceState {
            playback: self.state,
            name: self.name.clone(),
            position: self.position as f64 / rate,
            duration: self.len_frames() as f64 / rate,
        }
    }

    /// Add this voice's next frames into an interleaved stereo buffer
    pub fn mix_into(&mut self, output: &mut [f32]) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let frames = self.len_frames();

        for frame in output.chunks_exact_mut(2) {
            if self.position >= frames {
                // End of clip
                self.state = PlaybackState::Stopped;
                break;
            }

            let index = self.position * 2;
            frame[0] += self.samples[index];
            frame[1] += self.samples[index + 1];
            self.position += 1;
        }

        if self.position >= frames {
            self.state = PlaybackState::Stopped;
        }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stereo clip whose left channel counts frames in quarters
    fn ramp(frames: usize) -> Arc<Vec<f32>> {
        Arc::new(
            (0..frames)
                .flat_map(|i| [i as f32 * 0.25, 0.5])
                .collect(),
        )
    }

    #[test]
    fn test_play_requires_clip() {
        let mut voice = Voice::new(48000);
        assert!(!voice.play());
        assert!(!voice.is_playing());

        voice.load(ramp(4), Some("clap".into()));
        assert!(voice.play());
        assert!(voice.is_playing());
    }

    #[test]
    fn test_mix_adds_and_stops_at_end() {
        let mut voice = Voice::new(48000);
        voice.load(ramp(3), None);
        voice.play();

        let mut output = vec![1.0; 8];
        voice.mix_into(&mut output);

        assert_eq!(output, vec![1.0, 1.5, 1.25, 1.5, 1.5, 1.5, 1.0, 1.0]);
        assert!(!voice.is_playing());
    }

    #[test]
    fn test_rewind_while_playing_restarts() {
        let mut voice = Voice::new(48000);
        voice.load(ramp(100), None);
        voice.play();

        let mut output = vec![0.0; 20];
        voice.mix_into(&mut output);
        assert_eq!(voice.position_frames(), 10);

        voice.rewind();
        voice.play();
        let mut output = vec![0.0; 4];
        voice.mix_into(&mut output);

        // Single voice from frame 0: no leftover from the first trigger
        assert_eq!(output, vec![0.0, 0.5, 0.25, 0.5]);
        assert_eq!(voice.position_frames(), 2);
    }

    #[test]
    fn test_rewind_after_end_replays() {
        let mut voice = Voice::new(48000);
        voice.load(ramp(2), None);
        voice.play();
        voice.mix_into(&mut vec![0.0; 8]);
        assert!(!voice.is_playing());

        voice.rewind();
        assert!(voice.play());
        let mut output = vec![0.0; 2];
        voice.mix_into(&mut output);
        assert_eq!(output, vec![0.0, 0.5]);
    }

    #[test]
    fn test_report_empty_once() {
        let mut voice = Voice::new(48000);
        assert!(voice.report_empty_once());
        assert!(!voice.report_empty_once());

        voice.load(ramp(1), None);
        assert!(voice.report_empty_once());
    }

    #[test]
    fn test_state_durations() {
        let mut voice = Voice::new(1000);
        voice.load(ramp(500), Some("kick".into()));
        let state = voice.state();
        assert_eq!(state.duration, 0.5);
        assert_eq!(state.name.as_deref(), Some("kick"));
        assert_eq!(state.playback, PlaybackState::Stopped);
    }
}
