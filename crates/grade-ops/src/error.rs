//! Error types for grading operations.

use thiserror::Error;

/// Error type for grading operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A parameter lies outside its documented range.
    #[error("invalid parameter {stage}.{field} = {value} (expected {range})")]
    InvalidParameter {
        /// Stage that owns the parameter.
        stage: String,
        /// Parameter name.
        field: String,
        /// Offending value.
        value: f32,
        /// Valid range.
        range: String,
    },

    /// A curve definition is malformed.
    #[error("invalid curve {id}: {reason}")]
    InvalidCurve {
        /// Curve id.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// Buffer or dimension error.
    #[error(transparent)]
    Image(#[from] grade_core::Error),

    /// Parameter file could not be parsed or written.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Parameter file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled through its [`crate::CancelToken`].
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type for grading operations.
pub type OpsResult<T> = Result<T, OpsError>;

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`].
    pub fn invalid_parameter(
        stage: impl Into<String>,
        field: impl Into<String>,
        value: f32,
        range: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            stage: stage.into(),
            field: field.into(),
            value,
            range: range.into(),
        }
    }

    /// Checks `lo <= value <= hi` for a stage parameter. NaN and infinities
    /// are rejected.
    pub fn check(stage: &str, field: &str, value: f32, lo: f32, hi: f32) -> OpsResult<()> {
        if value.is_finite() && value >= lo && value <= hi {
            Ok(())
        } else {
            Err(Self::invalid_parameter(stage, field, value, format!("[{lo}, {hi}]")))
        }
    }

    /// Attaches a stage name to a color parameter error.
    pub fn from_color(stage: &str, err: grade_color::ColorError) -> Self {
        match err {
            grade_color::ColorError::OutOfRange { name, value, range } => {
                Self::invalid_parameter(stage, name, value, range)
            }
            other => Self::invalid_parameter(stage, other.to_string(), f32::NAN, "a known band"),
        }
    }

    /// Returns true for [`OpsError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
