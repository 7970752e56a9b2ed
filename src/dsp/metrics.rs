//! Signal metrics: SNR between an original and a processed buffer, plus
//! level helpers.
//!
//! SNR is measured on channel 0 only. Multi-channel buffers must still have
//! matching shapes, but channels beyond the first are not compared.

use crate::buffer::SampleBuffer;
use crate::error::{FilterError, Result};

/// Floor added to the error energy so identical signals give a large finite SNR.
pub const SNR_EPSILON: f64 = 1e-12;

/// Signal-to-noise ratio in dB: `10·log10(Σp² / (Σ(o-p)² + ε))` over channel 0.
///
/// Fails with `DimensionMismatch` if the buffers differ in channel or frame
/// count, and with `InvalidInput` for zero-length buffers.
pub fn compute_snr_db(original: &SampleBuffer, processed: &SampleBuffer) -> Result<f64> {
    if original.channel_count() != processed.channel_count()
        || original.frame_count() != processed.frame_count()
    {
        return Err(FilterError::DimensionMismatch {
            expected_channels: original.channel_count(),
            found_channels: processed.channel_count(),
            expected_frames: original.frame_count(),
            found_frames: processed.frame_count(),
        });
    }
    if original.frame_count() == 0 {
        return Err(FilterError::InvalidInput(
            "SNR of a zero-length buffer is undefined".to_string(),
        ));
    }

    let (o, p) = match (original.channel(0), processed.channel(0)) {
        (Some(o), Some(p)) => (o, p),
        _ => return Err(FilterError::InvalidInput("buffer has no channels".to_string())),
    };
    Ok(snr_db(o, p))
}

/// SNR of two equal-length sample slices. No shape checks.
pub fn snr_db(original: &[f32], processed: &[f32]) -> f64 {
    let mut signal = 0.0f64;
    let mut error = 0.0f64;
    for (&o, &p) in original.iter().zip(processed) {
        let (o, p) = (o as f64, p as f64);
        signal += p * p;
        let e = o - p;
        error += e * e;
    }
    10.0 * (signal / (error + SNR_EPSILON)).log10()
}

/// Root-mean-square level. Zero for an empty slice.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// RMS level in dBFS. `-inf` for silence.
pub fn rms_db(samples: &[f32]) -> f64 {
    20.0 * rms(samples).log10()
}

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

/// Level change from `before` to `after` in dB (negative = attenuated).
pub fn gain_db(before: &[f32], after: &[f32]) -> f64 {
    20.0 * (rms(after) / rms(before)).log10()
}

/// Min/max pair per display column, for waveform overviews.
///
/// Each column covers `ceil(len / columns)` samples; reads past the end count
/// as 0, so a column that lies entirely past the end is `(0.0, 0.0)`. An
/// empty slice yields `(1.0, -1.0)` for every column.
pub fn waveform_envelope(samples: &[f32], columns: usize) -> Vec<(f32, f32)> {
    if columns == 0 {
        return Vec::new();
    }
    let step = samples.len().div_ceil(columns);
    (0..columns)
        .map(|col| {
            let mut min = 1.0f32;
            let mut max = -1.0f32;
            for j in 0..step {
                let v = samples.get(col * step + j).copied().unwrap_or(0.0);
                min = min.min(v);
                max = max.max(v);
            }
            (min, max)
        })
        .collect()
}
