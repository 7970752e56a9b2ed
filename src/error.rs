use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Cutoff, Q or sample rate out of range. Raised before any sample is touched.
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },
    /// Two buffers that must share a shape do not.
    DimensionMismatch {
        expected_channels: usize,
        found_channels: usize,
        expected_frames: usize,
        found_frames: usize,
    },
    /// Structurally invalid or degenerate buffer.
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        FilterError::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid parameter {name} = {value}: {reason}")
            }
            FilterError::DimensionMismatch {
                expected_channels,
                found_channels,
                expected_frames,
                found_frames,
            } => write!(
                f,
                "Dimension mismatch: expected {expected_channels} channel(s) x \
                 {expected_frames} frame(s), found {found_channels} channel(s) x \
                 {found_frames} frame(s)"
            ),
            FilterError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_parameter() {
        let reason = "must be below Nyquist (22050 Hz)";
        let e = FilterError::invalid_parameter("cutoff_hz", 22050.0, reason);
        let msg = e.to_string();
        assert!(msg.contains("cutoff_hz"), "got {msg}");
        assert!(msg.contains("Nyquist"), "got {msg}");
    }

    #[test]
    fn display_dimension_mismatch() {
        let e = FilterError::DimensionMismatch {
            expected_channels: 2,
            found_channels: 1,
            expected_frames: 10,
            found_frames: 10,
        };
        assert_eq!(
            e.to_string(),
            "Dimension mismatch: expected 2 channel(s) x 10 frame(s), \
             found 1 channel(s) x 10 frame(s)"
        );
    }
}
