//! Error types for the flow-field core.
//!
//! Every variant is a configuration or programming error detected by a
//! precondition check. Numeric edge cases (`NaN`, infinities) are not
//! errors: they flow through the pipeline as values.

use thiserror::Error;

/// Errors produced by field construction, config parsing and I/O.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A pattern name did not match any of the four known patterns.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The step count was zero or not a power of two.
    #[error("invalid step count {0}: must be a positive power of two")]
    InvalidSteps(usize),

    /// The field was not square.
    #[error("field must be square: cols {cols} != rows {rows}")]
    NonSquareGrid { cols: usize, rows: usize },

    /// Width, height or field size was zero, or a point count overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A config value was outside its accepted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A distance metric name was not recognized.
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    /// A lookup strategy name was not recognized.
    #[error("invalid lookup strategy: {0}")]
    InvalidStrategy(String),

    /// Reading a config or writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_includes_name() {
        let err = FlowError::InvalidPattern("spiral".into());
        let msg = format!("{err}");
        assert!(msg.contains("spiral"), "missing name in: {msg}");
    }

    #[test]
    fn invalid_steps_mentions_power_of_two() {
        let msg = FlowError::InvalidSteps(12).to_string();
        assert!(msg.contains("12"), "missing step count in: {msg}");
        assert!(msg.contains("power of two"), "missing reason in: {msg}");
    }

    #[test]
    fn non_square_grid_includes_both_sides() {
        let msg = FlowError::NonSquareGrid { cols: 10, rows: 20 }.to_string();
        assert!(msg.contains("10"), "missing cols in: {msg}");
        assert!(msg.contains("20"), "missing rows in: {msg}");
    }

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = FlowError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_config_includes_message() {
        let msg = FlowError::InvalidConfig("fps must be positive".into()).to_string();
        assert!(msg.contains("fps must be positive"), "missing message in: {msg}");
    }

    #[test]
    fn metric_and_strategy_errors_include_names() {
        assert!(FlowError::InvalidMetric("chebyshev".into())
            .to_string()
            .contains("chebyshev"));
        assert!(FlowError::InvalidStrategy("kdtree".into())
            .to_string()
            .contains("kdtree"));
    }

    #[test]
    fn flow_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlowError>();
    }

    #[test]
    fn flow_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<FlowError>();
    }
}
