pub mod buffer;
pub mod config;
pub mod dsp;
pub mod error;

pub use crate::buffer::SampleBuffer;
pub use crate::config::RenderConfig;
pub use crate::dsp::filter::{
    BiquadCoefficients, BiquadFilter, FilterSpec, FilterState, FilterType, apply_filter,
};
pub use crate::dsp::metrics::compute_snr_db;
pub use crate::dsp::renderer::{FilterReport, RenderResult, render, render_and_score};
pub use crate::dsp::wav::encode_wav;
pub use crate::error::{FilterError, Result};

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_err(e: FilterError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-exposed: return the core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Filter interleaved samples with one filter type.
pub fn filter_interleaved(
    samples: &[f32],
    channel_count: usize,
    sample_rate: u32,
    filter_type: &str,
    cutoff_hz: f64,
    q: f64,
) -> Result<SampleBuffer> {
    let filter_type: FilterType = filter_type.parse()?;
    let original = SampleBuffer::from_interleaved(samples, channel_count, sample_rate)?;
    dsp::renderer::render_one(&original, filter_type, cutoff_hz, q)
}

/// WASM-exposed: filter interleaved f32 samples, returning interleaved output.
#[wasm_bindgen]
pub fn filter_samples(
    samples: Vec<f32>,
    channel_count: usize,
    sample_rate: u32,
    filter_type: &str,
    cutoff_hz: f64,
    q: f64,
) -> std::result::Result<Vec<f32>, JsValue> {
    filter_interleaved(&samples, channel_count, sample_rate, filter_type, cutoff_hz, q)
        .map(|buf| buf.to_interleaved())
        .map_err(js_err)
}

/// WASM-exposed: filter interleaved f32 samples and encode the result as WAV bytes.
#[wasm_bindgen]
pub fn filter_to_wav(
    samples: Vec<f32>,
    channel_count: usize,
    sample_rate: u32,
    filter_type: &str,
    cutoff_hz: f64,
    q: f64,
) -> std::result::Result<Vec<u8>, JsValue> {
    filter_interleaved(&samples, channel_count, sample_rate, filter_type, cutoff_hz, q)
        .map(|buf| encode_wav(&buf))
        .map_err(js_err)
}

/// WASM-exposed: SNR in dB between two mono sample arrays.
#[wasm_bindgen]
pub fn snr_db(
    original: Vec<f32>,
    processed: Vec<f32>,
    sample_rate: u32,
) -> std::result::Result<f64, JsValue> {
    let original = SampleBuffer::mono(sample_rate, original).map_err(js_err)?;
    let processed = SampleBuffer::mono(sample_rate, processed).map_err(js_err)?;
    compute_snr_db(&original, &processed).map_err(js_err)
}

/// Per-filter summary handed back to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub filter_type: FilterType,
    pub snr_db: f64,
    pub file_name: String,
}

/// Render every configured filter over interleaved input and score each one.
pub fn process_interleaved(
    samples: &[f32],
    channel_count: usize,
    sample_rate: u32,
    config: &RenderConfig,
) -> Result<Vec<ProcessSummary>> {
    let original = SampleBuffer::from_interleaved(samples, channel_count, sample_rate)?;
    config.validate(sample_rate)?;
    let reports = render_and_score(&original, config)?;
    Ok(reports
        .into_iter()
        .map(|r| ProcessSummary {
            filter_type: r.filter_type,
            snr_db: r.snr_db,
            file_name: r.filter_type.export_file_name().to_string(),
        })
        .collect())
}

/// WASM-exposed: run the configured renders and return `[{ filterType, snrDb, fileName }]`.
#[wasm_bindgen]
pub fn process_audio(
    samples: Vec<f32>,
    channel_count: usize,
    sample_rate: u32,
    config: JsValue,
) -> std::result::Result<JsValue, JsValue> {
    let config: RenderConfig = if config.is_undefined() || config.is_null() {
        RenderConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?
    };
    let summaries =
        process_interleaved(&samples, channel_count, sample_rate, &config).map_err(js_err)?;
    serde_wasm_bindgen::to_value(&summaries).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: min/max waveform overview of one channel of interleaved input,
/// flattened as `[min0, max0, min1, max1, ...]`.
#[wasm_bindgen]
pub fn waveform_overview(
    samples: Vec<f32>,
    channel_count: usize,
    channel: usize,
    columns: usize,
) -> Vec<f32> {
    if channel_count == 0 || channel >= channel_count {
        return Vec::new();
    }
    let mono: Vec<f32> = samples.iter().skip(channel).step_by(channel_count).copied().collect();
    dsp::metrics::waveform_envelope(&mono, columns)
        .into_iter()
        .flat_map(|(min, max)| [min, max])
        .collect()
}
