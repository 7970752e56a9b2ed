//! WAV encoder: canonical 44-byte-header, 16-bit little-endian PCM.

use crate::buffer::SampleBuffer;
use crate::error::{FilterError, Result};

pub const WAV_HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;
/// Largest channel count whose block align fits the header's `u16` field.
pub const MAX_CHANNELS: usize = (u16::MAX / (BITS_PER_SAMPLE / 8)) as usize;

/// Check that a buffer shape fits the 16-bit PCM header fields: block align
/// (`channels × 2`) in `u16`, byte rate and RIFF size in `u32`.
pub fn check_encodable(sample_rate: u32, channels: usize, frames: usize) -> Result<()> {
    let bytes_per_frame = channels as u64 * (BITS_PER_SAMPLE as u64 / 8);
    if bytes_per_frame > u16::MAX as u64 {
        return Err(FilterError::InvalidInput(format!(
            "{channels} channels exceed the WAV limit of {MAX_CHANNELS}"
        )));
    }
    let byte_rate = sample_rate as u64 * bytes_per_frame;
    if byte_rate > u32::MAX as u64 {
        return Err(FilterError::InvalidInput(format!(
            "byte rate {byte_rate} ({sample_rate} Hz x {channels} ch) does not fit a WAV header"
        )));
    }
    let riff_size = (frames as u64)
        .checked_mul(bytes_per_frame)
        .and_then(|data| data.checked_add(36));
    match riff_size {
        Some(size) if size <= u32::MAX as u64 => Ok(()),
        _ => Err(FilterError::InvalidInput(format!(
            "{frames} frame(s) x {channels} ch exceed the 4 GiB WAV size limit"
        ))),
    }
}

/// Clamp to [-1, 1] and quantize with `round(s * 32767)`. NaN maps to 0.
pub fn quantize_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0) as f64;
    (clamped * 32767.0).round() as i16
}

/// Encode a buffer as a WAV byte stream, frames interleaved across channels.
///
/// Total: `SampleBuffer` construction already rejects shapes that
/// [`check_encodable`] refuses, so every header field fits.
pub fn encode_wav(buffer: &SampleBuffer) -> Vec<u8> {
    let channels = buffer.channel_count();
    let mut pcm = Vec::with_capacity(buffer.frame_count() * channels);
    for frame in 0..buffer.frame_count() {
        for ch in buffer.channels() {
            pcm.push(quantize_i16(ch[frame]));
        }
    }
    encode_pcm_i16(&pcm, buffer.sample_rate(), channels as u16)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
///
/// Callers guarantee the shape passed [`check_encodable`].
fn encode_pcm_i16(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let byte_rate = sample_rate * channels as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
