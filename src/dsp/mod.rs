//! DSP: biquad filtering, offline rendering, metrics and WAV export.
//!
//! Everything here is pure computation over in-memory buffers. The same
//! code backs the WASM exports and native callers.

pub mod filter;
pub mod metrics;
pub mod renderer;
pub mod wav;
