//! Decoded PCM audio held as one `f32` vector per channel.

use crate::dsp::wav::check_encodable;
use crate::error::{FilterError, Result};

/// An immutable block of decoded audio.
///
/// Every channel has the same length (`frame_count`). Filtering never
/// mutates a buffer; it always builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Build a buffer from per-channel sample vectors.
    ///
    /// Shapes too large for a 16-bit WAV header are rejected here, so every
    /// buffer can be exported.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FilterError::InvalidInput("sample rate must be positive".to_string()));
        }
        let Some(first) = channels.first() else {
            return Err(FilterError::InvalidInput("buffer needs at least one channel".to_string()));
        };
        let frames = first.len();
        if let Some((index, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != frames) {
            return Err(FilterError::InvalidInput(format!(
                "channel {index} has {} frame(s), channel 0 has {frames}",
                ch.len()
            )));
        }
        check_encodable(sample_rate, channels.len(), frames)?;
        Ok(SampleBuffer { sample_rate, channels })
    }

    /// Shape already guaranteed by the caller (e.g. derived from a valid buffer).
    pub(crate) fn from_parts(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(!channels.is_empty());
        SampleBuffer { sample_rate, channels }
    }

    /// Single-channel buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// De-interleave `frame 0 ch 0, frame 0 ch 1, ...` into channel vectors.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(FilterError::InvalidInput("channel count must be positive".to_string()));
        }
        if samples.len() % channel_count != 0 {
            return Err(FilterError::InvalidInput(format!(
                "{} interleaved sample(s) do not divide into {channel_count} channel(s)",
                samples.len()
            )));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(sample_rate, channels)
    }

    /// Interleave channels back into a single vector.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for frame in 0..self.frame_count() {
            for ch in &self.channels {
                out.push(ch[frame]);
            }
        }
        out
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Samples of one channel, or `None` if `index` is out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}
