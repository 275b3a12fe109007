//! Error types for the KIBO emotion core.

use thiserror::Error;

use crate::types::EmotionDimension;

/// Malformed engine configuration. Fatal to engine construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A personality trait scalar lies outside [0, 1] or is not finite.
    #[error("Trait '{name}' out of range: {value} (expected 0.0..=1.0)")]
    TraitOutOfRange {
        /// Trait name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// The decay table has no entry for a dimension.
    #[error("Decay table is missing an entry for '{0}'")]
    MissingDimension(EmotionDimension),

    /// A baseline lies outside [0, 1] or is not finite.
    #[error("Baseline for '{dimension}' out of range: {value}")]
    BaselineOutOfRange {
        /// Dimension whose baseline is invalid.
        dimension: EmotionDimension,
        /// Offending value.
        value: f32,
    },

    /// A half-life is zero, negative or not finite.
    #[error("Half-life for '{dimension}' must be positive, got {value}s")]
    NonPositiveHalfLife {
        /// Dimension whose half-life is invalid.
        dimension: EmotionDimension,
        /// Offending value.
        value: f64,
    },

    /// Awake window hours or offset are invalid.
    #[error("Invalid awake window: {0}")]
    InvalidAwakeWindow(String),

    /// A scoring, energy or blend parameter is invalid.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Malformed stimulus payload. The stimulus is rejected and state is untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Touch duration was negative.
    #[error("Touch duration must be non-negative, got {0}s")]
    NegativeDuration(f64),

    /// A numeric payload was NaN or infinite.
    #[error("Non-finite value for '{0}'")]
    NonFinite(&'static str),

    /// Proximity distance outside the sensor's physical range.
    #[error("Distance {distance_cm}cm outside sensor range 0..={max_cm}cm")]
    DistanceOutOfRange {
        /// Reported distance.
        distance_cm: f64,
        /// Configured maximum.
        max_cm: f64,
    },

    /// Hour of day not in 0..24.
    #[error("Hour of day out of range: {0}")]
    HourOutOfRange(u8),

    /// An emotion intensity outside [0, 1].
    #[error("Intensity out of range: {0} (expected 0.0..=1.0)")]
    IntensityOutOfRange(f32),

    /// An emotion sequence with no entries.
    #[error("Emotion sequence is empty")]
    EmptySequence,

    /// A label that names no emotion dimension.
    #[error("Unknown emotion: '{0}'")]
    UnknownEmotion(String),

    /// A label that names no touch location.
    #[error("Unknown touch location: '{0}'")]
    UnknownTouchLocation(String),
}

/// Top-level error type for all KIBO core operations.
#[derive(Error, Debug)]
pub enum KiboError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Stimulus validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Emotion state found outside its invariants. Indicates a bug.
    #[error("Invariant violated: '{dimension}' = {value}")]
    InvariantViolation {
        /// Offending dimension.
        dimension: EmotionDimension,
        /// Offending value.
        value: f32,
    },

    /// Serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, KiboError>;
