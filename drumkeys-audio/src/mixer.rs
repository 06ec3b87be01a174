//! Master bus - volume smoothing and soft clipping

/// Master bus applied after all voices are summed
pub struct Mixer {
    /// Master volume
    master_volume: f32,
    /// Smoothed master volume (interpolates toward master_volume to prevent clicks)
    smoothed_master_volume: f32,
}

impl Mixer {
    /// Smoothing coefficient for master volume (~5ms at 48kHz)
    const MASTER_VOLUME_SMOOTH_COEFF: f32 = 0.995;
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            smoothed_master_volume: 1.0,
        }
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set master volume (0.0 to 2.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 2.0);
    }

    pub fn adjust_master_volume(&mut self, delta: f32) {
        self.set_master_volume(self.master_volume + delta);
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Apply master volume and soft clipping to an interleaved stereo buffer in place
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_mut(2) {
            self.smoothed_master_volume = Self::MASTER_VOLUME_SMOOTH_COEFF
                * self.smoothed_master_volume
                + (1.0 - Self::MASTER_VOLUME_SMOOTH_COEFF) * self.master_volume;

            for sample in frame.iter_mut() {
                *sample = soft_clip(*sample * self.smoothed_master_volume);
            }
        }
    }
}

/// Soft clip threshold - below this the bus is fully transparent
const SOFT_CLIP_THRESHOLD: f32 = 0.75;
/// Soft clip ceiling
const SOFT_CLIP_CEILING: f32 = 0.89;

/// Gentle soft clipper for the master bus
///
/// Several pads hit together can sum past full scale; peaks above the
/// threshold are bent asymptotically toward the ceiling.
#[inline(always)]
fn soft_clip(x: f32) -> f32 {
    let abs_x = x.abs();

    if abs_x <= SOFT_CLIP_THRESHOLD {
        return x;
    }

    let sign = x.signum();
    let knee_width = SOFT_CLIP_CEILING - SOFT_CLIP_THRESHOLD;
    let over = abs_x - SOFT_CLIP_THRESHOLD;
    let ratio = over / knee_width;

    let compressed = SOFT_CLIP_THRESHOLD + knee_width * (1.0 - (-ratio * 3.0).exp());
    sign * compressed.min(SOFT_CLIP_CEILING)
}
