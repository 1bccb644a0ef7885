//! Error types for the impact_vision library.

use thiserror::Error;

/// Result type alias for impact_vision operations.
pub type Result<T> = std::result::Result<T, ImpactError>;

/// Reasons a calibration attempt can fail. All of them are recoverable: the
/// session keeps running with its previous calibration state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// The reference frame contained no blob inside the colour range.
    #[error("calibration failed: ball not detected")]
    NoBallDetected,

    /// The largest blob had a zero-sized bounding box.
    #[error("calibration failed: degenerate bounding box {width}x{height}")]
    DegenerateBoundingBox { width: u32, height: u32 },

    /// The reference frame itself could not be captured.
    #[error("calibration failed: could not capture frame ({reason})")]
    CaptureUnavailable { reason: String },
}

/// Top-level error taxonomy for a session.
#[derive(Error, Debug)]
pub enum ImpactError {
    /// The capture device failed to deliver a frame (disconnect, end of stream).
    #[error("capture unavailable: {reason}")]
    CaptureUnavailable { reason: String },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// A display surface operation failed.
    #[error("display error during {operation}: {reason}")]
    Display { operation: String, reason: String },

    /// Invalid configuration value.
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImpactError {
    pub fn capture(reason: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            reason: reason.into(),
        }
    }

    pub fn display(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Display {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Recoverable errors are reported and the loop carries on; everything
    /// else ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ImpactError::Calibration(_))
    }
}
