//! Offline renderer: runs each requested filter over a complete buffer.
//!
//! Every filter type is an independent render of the same original; renders
//! are never chained. With the `parallel` feature the per-type renders run
//! on the rayon pool.

use std::collections::BTreeMap;

use crate::buffer::SampleBuffer;
use crate::config::RenderConfig;
use crate::error::Result;

use super::filter::{BiquadCoefficients, FilterSpec, FilterType, apply_filter};
use super::metrics::compute_snr_db;
use super::wav::encode_wav;

/// Filtered buffers keyed by filter type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderResult {
    buffers: BTreeMap<FilterType, SampleBuffer>,
}

impl RenderResult {
    pub fn get(&self, filter_type: FilterType) -> Option<&SampleBuffer> {
        self.buffers.get(&filter_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterType, &SampleBuffer)> {
        self.buffers.iter().map(|(&ft, buf)| (ft, buf))
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<FilterType, SampleBuffer> {
        self.buffers
    }
}

/// One rendered variant together with its SNR against the original.
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub filter_type: FilterType,
    pub snr_db: f64,
    pub buffer: SampleBuffer,
}

/// Apply one set of coefficients to every channel of `original`.
pub fn render_with_coefficients(
    original: &SampleBuffer,
    coeffs: &BiquadCoefficients,
) -> SampleBuffer {
    let channels: Vec<Vec<f32>> = original
        .channels()
        .enumerate()
        .map(|(index, samples)| {
            tracing::trace!(channel = index, frames = samples.len(), "filtering channel");
            apply_filter(samples, coeffs)
        })
        .collect();
    SampleBuffer::from_parts(original.sample_rate(), channels)
}

fn log_finished(filter_type: FilterType, out: &SampleBuffer) {
    tracing::debug!(
        filter = %filter_type,
        channels = out.channel_count(),
        frames = out.frame_count(),
        seconds = out.duration(),
        "filter render finished"
    );
}

/// Render a single filter type over `original`.
pub fn render_one(
    original: &SampleBuffer,
    filter_type: FilterType,
    cutoff_hz: f64,
    q: f64,
) -> Result<SampleBuffer> {
    let coeffs = BiquadCoefficients::derive(filter_type, original.sample_rate(), cutoff_hz, q)?;
    let out = render_with_coefficients(original, &coeffs);
    log_finished(filter_type, &out);
    Ok(out)
}

/// Render each requested filter type over the unmodified `original`.
///
/// Duplicate types are rendered once.
pub fn render(
    original: &SampleBuffer,
    requested: &[FilterType],
    cutoff_hz: f64,
    q: f64,
) -> Result<RenderResult> {
    let specs: Vec<FilterSpec> = requested
        .iter()
        .map(|&ft| FilterSpec::new(ft, cutoff_hz, q))
        .collect();
    render_specs(original, &specs)
}

/// Render each spec over the unmodified `original`.
///
/// Coefficients for every spec are derived before any sample is processed,
/// so an out-of-range parameter produces no partial output. When a type
/// appears more than once, the first spec for it wins.
pub fn render_specs(original: &SampleBuffer, specs: &[FilterSpec]) -> Result<RenderResult> {
    let mut jobs: Vec<(FilterType, BiquadCoefficients)> = Vec::with_capacity(specs.len());
    for spec in specs {
        if jobs.iter().any(|(ft, _)| *ft == spec.filter_type) {
            continue;
        }
        jobs.push((spec.filter_type, spec.coefficients(original.sample_rate())?));
    }

    let buffers = run_jobs(original, jobs);
    for (&filter_type, out) in &buffers {
        log_finished(filter_type, out);
    }

    Ok(RenderResult { buffers })
}

#[cfg(not(feature = "parallel"))]
fn run_jobs(
    original: &SampleBuffer,
    jobs: Vec<(FilterType, BiquadCoefficients)>,
) -> BTreeMap<FilterType, SampleBuffer> {
    jobs.into_iter()
        .map(|(ft, coeffs)| (ft, render_with_coefficients(original, &coeffs)))
        .collect()
}

#[cfg(feature = "parallel")]
fn run_jobs(
    original: &SampleBuffer,
    jobs: Vec<(FilterType, BiquadCoefficients)>,
) -> BTreeMap<FilterType, SampleBuffer> {
    use rayon::prelude::*;

    jobs.into_par_iter()
        .map(|(ft, coeffs)| (ft, render_with_coefficients(original, &coeffs)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Render using a [`RenderConfig`].
pub fn render_config(original: &SampleBuffer, config: &RenderConfig) -> Result<RenderResult> {
    let specs: Vec<FilterSpec> = config.specs().collect();
    render_specs(original, &specs)
}

/// Render every configured type and score each against the original.
///
/// Reports come back in the configured order.
pub fn render_and_score(
    original: &SampleBuffer,
    config: &RenderConfig,
) -> Result<Vec<FilterReport>> {
    let result = render_config(original, config)?;
    let mut buffers = result.into_inner();
    let mut reports = Vec::with_capacity(buffers.len());
    for &filter_type in &config.filter_types {
        let Some(buffer) = buffers.remove(&filter_type) else {
            continue;
        };
        let snr_db = compute_snr_db(original, &buffer)?;
        tracing::debug!(filter = %filter_type, snr_db, "scored render");
        reports.push(FilterReport {
            filter_type,
            snr_db,
            buffer,
        });
    }
    Ok(reports)
}

/// Encode every render as WAV, paired with its conventional file name.
pub fn export_all(result: &RenderResult) -> Vec<(String, Vec<u8>)> {
    result
        .iter()
        .map(|(ft, buf)| (ft.export_file_name().to_string(), encode_wav(buf)))
        .collect()
}
