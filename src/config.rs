//! Render configuration, as sent by the front-end (JSON, camelCase keys).

use serde::{Deserialize, Serialize};

use crate::dsp::filter::{FilterSpec, FilterType, validate_parameters};
use crate::error::{FilterError, Result};

fn default_cutoff_hz() -> f64 {
    1000.0
}

fn default_q() -> f64 {
    1.0
}

fn default_filter_types() -> Vec<FilterType> {
    FilterType::ALL.to_vec()
}

/// Cutoff, Q and the filter types to render. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default = "default_cutoff_hz")]
    pub cutoff_hz: f64,
    #[serde(default = "default_q")]
    pub q: f64,
    #[serde(default = "default_filter_types")]
    pub filter_types: Vec<FilterType>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            cutoff_hz: default_cutoff_hz(),
            q: default_q(),
            filter_types: default_filter_types(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FilterError::InvalidInput(format!("bad render config: {e}")))
    }

    pub fn to_json(&self) -> String {
        // Plain struct of numbers and unit enums; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Check the parameters against a sample rate without touching any audio.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        validate_parameters(sample_rate, self.cutoff_hz, self.q)
    }

    pub fn specs(&self) -> impl Iterator<Item = FilterSpec> + '_ {
        self.filter_types
            .iter()
            .map(|&ft| FilterSpec::new(ft, self.cutoff_hz, self.q))
    }
}
