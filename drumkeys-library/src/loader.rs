//! Clip file loading and decoding

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur during clip loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// A loaded and decoded clip
#[derive(Debug, Clone)]
pub struct LoadedClip {
    /// Interleaved stereo samples (f32, normalized to -1.0 to 1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz after resampling
    pub sample_rate: u32,
    /// Sample rate of the file
    pub source_sample_rate: u32,
    /// Channel count of the file
    pub source_channels: u16,
}

impl LoadedClip {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }
}

/// Clip loader using Symphonia, resampling to the output device rate
pub struct ClipLoader {
    target_sample_rate: u32,
}

impl Default for ClipLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipLoader {
    /// Create a new clip loader with default 48kHz sample rate
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a new clip loader with specific sample rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Load and decode an audio file into interleaved stereo at the target rate
    pub fn load(&self, path: &Path) -> Result<LoadedClip, LoadError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        // Find first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2)
            .max(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        // Decode all samples
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "stopped reading packets");
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping undecodable packet");
                    continue;
                }
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        let stereo = to_stereo(&samples, channels);

        let (samples, sample_rate) = if source_sample_rate != self.target_sample_rate {
            (
                self.resample(&stereo, source_sample_rate)?,
                self.target_sample_rate,
            )
        } else {
            (stereo, source_sample_rate)
        };

        tracing::debug!(
            path = %path.display(),
            source_sample_rate,
            channels,
            frames = samples.len() / 2,
            "decoded clip"
        );

        Ok(LoadedClip {
            samples,
            sample_rate,
            source_sample_rate,
            source_channels: channels,
        })
    }

    /// Resample interleaved stereo audio to the target sample rate
    ///
    /// The resampler's output delay is trimmed from the front and the input
    /// is zero-padded far enough to flush the tail, so the result lines up
    /// with the source and has its scaled length.
    fn resample(&self, samples: &[f32], source_rate: u32) -> Result<Vec<f32>, LoadError> {
        use rubato::{FftFixedInOut, Resampler};

        const CHANNELS: usize = 2;
        let frames = samples.len() / CHANNELS;
        if frames == 0 {
            return Ok(Vec::new());
        }

        let mut resampler = FftFixedInOut::<f32>::new(
            source_rate as usize,
            self.target_sample_rate as usize,
            1024,
            CHANNELS,
        )
        .map_err(|e| LoadError::Decode(e.to_string()))?;

        let chunk_in = resampler.input_frames_next();
        let chunk_out = resampler.output_frames_next();
        let delay = resampler.output_delay();
        let expected = (frames as u64 * self.target_sample_rate as u64)
            .div_ceil(source_rate.max(1) as u64) as usize;
        let chunks = (delay + expected).div_ceil(chunk_out.max(1));

        // Deinterleave, zero-padded to whole chunks
        let deinterleaved: Vec<Vec<f32>> = (0..CHANNELS)
            .map(|ch| {
                let mut v: Vec<f32> = (0..frames).map(|f| samples[f * CHANNELS + ch]).collect();
                v.resize(chunks * chunk_in, 0.0);
                v
            })
            .collect();

        let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(chunks * chunk_out); CHANNELS];
        for chunk in 0..chunks {
            let pos = chunk * chunk_in;
            let input_refs: Vec<&[f32]> = deinterleaved
                .iter()
                .map(|ch| &ch[pos..pos + chunk_in])
                .collect();

            let resampled = resampler
                .process(&input_refs, None)
                .map_err(|e| LoadError::Decode(e.to_string()))?;

            for (ch, data) in resampled.into_iter().enumerate() {
                output[ch].extend(data);
            }
        }

        // Reinterleave the aligned window
        let available = output[0].len().min(output[1].len());
        let end = (delay + expected).min(available);
        let mut interleaved = Vec::with_capacity(end.saturating_sub(delay) * CHANNELS);
        for frame_idx in delay.min(end)..end {
            for channel in &output {
                interleaved.push(channel[frame_idx]);
            }
        }

        Ok(interleaved)
    }
}

/// Convert interleaved audio with any channel count to interleaved stereo
///
/// Mono is duplicated to both sides; channels beyond the first two are dropped.
pub fn to_stereo(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples
            .chunks_exact(n as usize)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}
