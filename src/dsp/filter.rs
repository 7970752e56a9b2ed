//! Biquad filter: Audio EQ Cookbook coefficients with a linear Q.
//!
//! Coefficients are derived once per (type, sample rate, cutoff, Q) and
//! applied with the Direct Form I recursion
//! `y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]`.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Filter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
}

impl FilterType {
    /// All supported types, in render and export order.
    pub const ALL: [FilterType; 3] =
        [FilterType::Lowpass, FilterType::Highpass, FilterType::Bandpass];

    pub fn label(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
            FilterType::Bandpass => "bandpass",
        }
    }

    /// File name downstream consumers expect for an exported render.
    pub fn export_file_name(self) -> &'static str {
        match self {
            FilterType::Lowpass => "LOW_PASS.wav",
            FilterType::Highpass => "HIGH_PASS.wav",
            FilterType::Bandpass => "BAND_PASS.wav",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Ok(FilterType::Lowpass),
            "highpass" => Ok(FilterType::Highpass),
            "bandpass" => Ok(FilterType::Bandpass),
            other => Err(FilterError::InvalidInput(format!("unknown filter type '{other}'"))),
        }
    }
}

/// Requested filter: type, cutoff (centre frequency for bandpass) and Q.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub filter_type: FilterType,
    pub cutoff_hz: f64,
    pub q: f64,
}

impl FilterSpec {
    pub fn new(filter_type: FilterType, cutoff_hz: f64, q: f64) -> Self {
        FilterSpec { filter_type, cutoff_hz, q }
    }

    pub fn coefficients(&self, sample_rate: u32) -> Result<BiquadCoefficients> {
        BiquadCoefficients::derive(self.filter_type, sample_rate, self.cutoff_hz, self.q)
    }
}

/// Reject anything a biquad cannot be derived from. Shared with config validation.
pub fn validate_parameters(sample_rate: u32, cutoff_hz: f64, q: f64) -> Result<()> {
    if sample_rate == 0 {
        return Err(FilterError::invalid_parameter("sample_rate", 0.0, "must be positive"));
    }
    let nyquist = sample_rate as f64 / 2.0;
    // NaN fails every comparison below, so test for the valid range instead.
    if !(cutoff_hz > 0.0) {
        return Err(FilterError::invalid_parameter("cutoff_hz", cutoff_hz, "must be positive"));
    }
    if !(cutoff_hz < nyquist) {
        return Err(FilterError::invalid_parameter(
            "cutoff_hz",
            cutoff_hz,
            format!("must be below Nyquist ({nyquist} Hz)"),
        ));
    }
    if !(q > 0.0) || !q.is_finite() {
        return Err(FilterError::invalid_parameter("q", q, "must be positive and finite"));
    }
    Ok(())
}

/// Normalized (a0 = 1) biquad coefficients.
///
/// Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Derive coefficients for `filter_type` at `cutoff_hz` with quality `q`.
    ///
    /// Fails with `InvalidParameter` when `cutoff_hz <= 0`,
    /// `cutoff_hz >= sample_rate / 2` or `q <= 0`. Large Q near Nyquist is
    /// passed through unclamped.
    pub fn derive(
        filter_type: FilterType,
        sample_rate: u32,
        cutoff_hz: f64,
        q: f64,
    ) -> Result<Self> {
        validate_parameters(sample_rate, cutoff_hz, q)?;

        let w0 = 2.0 * PI * cutoff_hz / sample_rate as f64;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        let (b0, b1, b2) = match filter_type {
            FilterType::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterType::Highpass => {
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0)
            }
            // Constant 0 dB peak gain
            FilterType::Bandpass => (alpha, 0.0, -alpha),
        };

        let coeffs = BiquadCoefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };

        tracing::debug!(
            filter = %filter_type,
            sample_rate,
            cutoff_hz,
            q,
            b0 = coeffs.b0,
            b1 = coeffs.b1,
            b2 = coeffs.b2,
            a1 = coeffs.a1,
            a2 = coeffs.a2,
            "derived biquad coefficients"
        );
        if !coeffs.is_stable() {
            tracing::warn!(
                filter = %filter_type,
                cutoff_hz,
                q,
                "biquad poles on or outside the unit circle"
            );
        }

        Ok(coeffs)
    }

    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }

    /// Stability triangle for a monic second-order denominator.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Magnitude response at `freq_hz`, evaluated on the unit circle.
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: u32) -> f64 {
        let w = 2.0 * PI * freq_hz / sample_rate as f64;
        let (c1, s1) = (w.cos(), w.sin());
        let (c2, s2) = ((2.0 * w).cos(), (2.0 * w).sin());
        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);
        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }
}

/// Per-channel recursion memory: the two previous inputs and outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl FilterState {
    /// Advance the recursion by one input sample.
    #[inline]
    pub fn process(&mut self, input: f64, c: &BiquadCoefficients) -> f64 {
        let output =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// A biquad IIR filter (2nd order) bound to one channel.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoefficients,
    state: FilterState,
}

impl BiquadFilter {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        BiquadFilter {
            coeffs,
            state: FilterState::default(),
        }
    }

    pub fn from_spec(spec: &FilterSpec, sample_rate: u32) -> Result<Self> {
        Ok(Self::new(spec.coefficients(sample_rate)?))
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Process a single sample through the filter.
    pub fn process(&mut self, input: f64) -> f64 {
        self.state.process(input, &self.coeffs)
    }

    /// Filter a block, continuing from the current state.
    pub fn process_block(&mut self, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .map(|&x| self.process(x as f64) as f32)
            .collect()
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }
}

/// Filter `samples` from a zeroed state. Output length equals input length.
pub fn apply_filter(samples: &[f32], coeffs: &BiquadCoefficients) -> Vec<f32> {
    BiquadFilter::new(*coeffs).process_block(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, amplitude: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin()) as f32)
            .collect()
    }

    fn peak_after(samples: &[f32], skip: usize) -> f32 {
        samples[skip..].iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn coefficients_finite_across_range() {
        for &sr in &[8000u32, 22050, 44100, 48000, 96000] {
            for &frac in &[0.001, 0.01, 0.1, 0.25, 0.4, 0.499] {
                for &q in &[0.1, 0.707, 1.0, 10.0] {
                    for ft in FilterType::ALL {
                        let c = BiquadCoefficients::derive(ft, sr, sr as f64 * frac, q).unwrap();
                        assert!(c.is_finite(), "{ft} sr={sr} frac={frac} q={q}: {c:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn lowpass_matches_cookbook_values() {
        // fs = 48 kHz, f0 = 12 kHz puts w0 at pi/2: cos = 0, sin = 1.
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 48000, 12000.0, 1.0).unwrap();
        let a0 = 1.5;
        assert!((c.b0 - 0.5 / a0).abs() < 1e-12);
        assert!((c.b1 - 1.0 / a0).abs() < 1e-12);
        assert!((c.b2 - 0.5 / a0).abs() < 1e-12);
        assert!(c.a1.abs() < 1e-12);
        assert!((c.a2 - 0.5 / a0).abs() < 1e-12);
    }

    #[test]
    fn bandpass_has_zero_b1_and_antisymmetric_b() {
        let c = BiquadCoefficients::derive(FilterType::Bandpass, 44100, 1000.0, 2.0).unwrap();
        assert_eq!(c.b1, 0.0);
        assert!((c.b0 + c.b2).abs() < 1e-15);
    }

    #[test]
    fn rejects_nyquist_and_above() {
        for cutoff in [22050.0, 22050.5, 30000.0] {
            let err =
                BiquadCoefficients::derive(FilterType::Lowpass, 44100, cutoff, 1.0).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidParameter { name: "cutoff_hz", .. }),
                "cutoff {cutoff} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_non_positive_cutoff_and_q() {
        assert!(BiquadCoefficients::derive(FilterType::Highpass, 44100, 0.0, 1.0).is_err());
        assert!(BiquadCoefficients::derive(FilterType::Highpass, 44100, -5.0, 1.0).is_err());
        assert!(BiquadCoefficients::derive(FilterType::Highpass, 44100, f64::NAN, 1.0).is_err());
        assert!(matches!(
            BiquadCoefficients::derive(FilterType::Bandpass, 44100, 1000.0, 0.0),
            Err(FilterError::InvalidParameter { name: "q", .. })
        ));
        assert!(BiquadCoefficients::derive(FilterType::Bandpass, 44100, 1000.0, -1.0).is_err());
    }

    #[test]
    fn zero_input_stays_zero() {
        let c = BiquadCoefficients::derive(FilterType::Bandpass, 44100, 440.0, 5.0).unwrap();
        let out = apply_filter(&[0.0; 257], &c);
        assert_eq!(out.len(), 257);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 44100, 440.0, 1.0).unwrap();
        assert!(apply_filter(&[], &c).is_empty());
    }

    #[test]
    fn first_samples_follow_difference_equation() {
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 44100, 2000.0, 0.9).unwrap();
        let x = [1.0f32, 0.5, -0.25];
        let y = apply_filter(&x, &c);
        let y0 = c.b0;
        let y1 = c.b0 * 0.5 + c.b1 * 1.0 - c.a1 * y0;
        let y2 = c.b0 * -0.25 + c.b1 * 0.5 + c.b2 * 1.0 - c.a1 * y1 - c.a2 * y0;
        assert!((y[0] as f64 - y0).abs() < 1e-6);
        assert!((y[1] as f64 - y1).abs() < 1e-6);
        assert!((y[2] as f64 - y2).abs() < 1e-6);
    }

    #[test]
    fn lowpass_passes_dc() {
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 44100, 5000.0, 0.707).unwrap();
        let out = apply_filter(&[1.0; 1000], &c);
        let last = *out.last().unwrap();
        assert!((last - 1.0).abs() < 0.001, "Lowpass should pass DC, got {last}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let c = BiquadCoefficients::derive(FilterType::Highpass, 44100, 1000.0, 0.707).unwrap();
        let out = apply_filter(&[1.0; 1000], &c);
        let last = *out.last().unwrap();
        assert!(last.abs() < 0.001, "Highpass should block DC, got {last}");
    }

    #[test]
    fn lowpass_attenuates_high_freq() {
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 44100, 200.0, 0.707).unwrap();
        let out = apply_filter(&sine(10000.0, 44100, 1.0, 4410), &c);
        let max_out = peak_after(&out, 1000);
        assert!(
            max_out < 0.01,
            "Lowpass@200Hz should strongly attenuate 10kHz, got amplitude {max_out}"
        );
    }

    #[test]
    fn bandpass_unity_at_centre() {
        let c = BiquadCoefficients::derive(FilterType::Bandpass, 44100, 1000.0, 1.0).unwrap();
        assert!((c.magnitude_at(1000.0, 44100) - 1.0).abs() < 1e-9);
        assert!(c.magnitude_at(100.0, 44100) < 0.2);
    }

    #[test]
    fn filter_output_finite() {
        let c = BiquadCoefficients::derive(FilterType::Bandpass, 44100, 1000.0, 0.707).unwrap();
        let impulses: Vec<f32> = (0..10000).map(|i| if i % 100 == 0 { 1.0 } else { 0.0 }).collect();
        for (i, out) in apply_filter(&impulses, &c).iter().enumerate() {
            assert!(out.is_finite(), "Filter output not finite at sample {i}");
        }
    }

    #[test]
    fn block_processing_continues_state_until_reset() {
        let c = BiquadCoefficients::derive(FilterType::Lowpass, 44100, 800.0, 1.0).unwrap();
        let input = sine(300.0, 44100, 0.5, 64);
        let whole = apply_filter(&input, &c);

        let mut f = BiquadFilter::new(c);
        let mut split = f.process_block(&input[..20]);
        split.extend(f.process_block(&input[20..]));
        assert_eq!(whole, split);

        f.reset();
        assert_eq!(f.process_block(&input), whole);
    }

    #[test]
    fn filter_from_spec_uses_spec_coefficients() {
        let spec = FilterSpec::new(FilterType::Highpass, 120.0, 0.5);
        let f = BiquadFilter::from_spec(&spec, 48000).unwrap();
        assert_eq!(*f.coefficients(), spec.coefficients(48000).unwrap());
        let above_nyquist = FilterSpec::new(FilterType::Highpass, 24000.0, 0.5);
        assert!(BiquadFilter::from_spec(&above_nyquist, 48000).is_err());
    }

    #[test]
    fn filter_type_labels_and_parse() {
        for ft in FilterType::ALL {
            assert_eq!(ft.label().parse::<FilterType>().unwrap(), ft);
        }
        assert_eq!(" BandPass ".parse::<FilterType>().unwrap(), FilterType::Bandpass);
        assert!("notch".parse::<FilterType>().is_err());
        assert_eq!(FilterType::Highpass.export_file_name(), "HIGH_PASS.wav");
    }

    #[test]
    fn filter_type_serde_lowercase() {
        let json = serde_json::to_string(&FilterType::Bandpass).unwrap();
        assert_eq!(json, "\"bandpass\"");
        let spec: FilterSpec =
            serde_json::from_str(r#"{"filterType":"lowpass","cutoffHz":500.0,"q":0.7}"#).unwrap();
        assert_eq!(spec, FilterSpec::new(FilterType::Lowpass, 500.0, 0.7));
    }
}
