use thiserror::Error;

/// Errors raised by the cascade core.
///
/// Every variant is a deterministic function of the caller's input, so
/// nothing here is worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CascadeError {
    #[error("invalid sweep range: need max > min and num_points >= 2 (got min={min}, max={max}, num_points={num_points})")]
    InvalidRange { min: f64, max: f64, num_points: usize },

    #[error("windshield size {windshield_size} is negative and cannot be raised to the fractional exponent {exponent}")]
    Domain { windshield_size: f64, exponent: f64 },

    #[error("unknown coefficient preset '{0}' (use 'baseline' or 'refined')")]
    UnknownPreset(String),
}
