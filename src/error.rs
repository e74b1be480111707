//! Error types for the sounding-thermo crate.
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnalysisError {
    /// Malformed input profile. Not retryable, the caller must fix the data.
    #[error("Invalid profile: {0}")]
    InvalidProfile(ProfileDefect),
    /// An interpolation query fell outside the pressure range covered by the profile.
    #[error("Pressure {pressure} hPa is outside the range of the profile.")]
    OutOfRange {
        /// The requested pressure in hPa.
        pressure: f64,
    },
    /// The parcel never reached saturation within the profile.
    #[error("Parcel never reached saturation within the profile.")]
    SaturationNeverReached,
    /// A root finder failed to converge within its iteration cap.
    #[error("Root finding failed to converge near {pressure} hPa.")]
    NumericDivergence {
        /// Pressure level (hPa) where the solve failed.
        pressure: f64,
    },
    /// Not enough data available for the requested quantity.
    #[error("Not enough data available for analysis.")]
    InsufficientData,
    /// A configuration value is out of bounds.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Input that could not be decoded at all.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

/// The specific reason a profile failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ProfileDefect {
    /// Fewer than two distinct levels.
    #[error("fewer than 2 levels")]
    TooFewLevels,
    /// A value was NaN or infinite.
    #[error("non-finite value at level {index}")]
    NonFinite {
        /// Index into the input levels.
        index: usize,
    },
    /// Pressure must be positive.
    #[error("non-positive pressure at level {index}")]
    NonPositivePressure {
        /// Index into the input levels.
        index: usize,
    },
    /// Pressure must strictly decrease upward.
    #[error("pressure increases at {pressure} hPa")]
    PressureNotDecreasing {
        /// Offending pressure in hPa.
        pressure: f64,
    },
    /// Height must not decrease upward.
    #[error("height decreases at {pressure} hPa")]
    HeightDecreasing {
        /// Offending pressure in hPa.
        pressure: f64,
    },
    /// Temperature at or below absolute zero.
    #[error("unphysical temperature at {pressure} hPa")]
    UnphysicalTemperature {
        /// Offending pressure in hPa.
        pressure: f64,
    },
    /// Dew point above temperature by more than the clamp tolerance.
    #[error("dew point exceeds temperature by {excess} C at {pressure} hPa")]
    DewPointAboveTemperature {
        /// Offending pressure in hPa.
        pressure: f64,
        /// Dew point minus temperature in C.
        excess: f64,
    },
    /// Negative speed or a direction outside 0-360.
    #[error("invalid wind at {pressure} hPa")]
    InvalidWind {
        /// Offending pressure in hPa.
        pressure: f64,
    },
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<ProfileDefect> for AnalysisError {
    fn from(defect: ProfileDefect) -> Self {
        AnalysisError::InvalidProfile(defect)
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::MalformedInput(err.to_string())
    }
}
