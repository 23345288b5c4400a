//! Error types for the nowcasting crates.

use thiserror::Error;

/// Result type alias using WxError.
pub type WxResult<T> = Result<T, WxError>;

/// Primary error type for patch retrieval, inference and rendering.
#[derive(Debug, Error)]
pub enum WxError {
    // === Request Errors ===
    #[error("Invalid forecast time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    // === Data Errors ===
    #[error("Data not available for time: {0}")]
    DataNotAvailable(String),

    #[error("Requested window {requested} is outside tile bounds {tile}")]
    OutOfBounds { requested: String, tile: String },

    #[error("Invalid patch file: {0}")]
    PatchFormat(String),

    #[error("Channel mismatch: expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    // === Model Errors ===
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    // === Rendering Errors ===
    #[error("Invalid value range: min {min} must be below max {max}")]
    InvalidRange { min: f32, max: f32 },

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WxError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, tile: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            tile: tile.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WxError::InvalidTime(_)
            | WxError::InvalidParameter { .. }
            | WxError::OutOfBounds { .. }
            | WxError::InvalidRange { .. } => 400,

            WxError::UnknownScenario(_)
            | WxError::UnknownModel(_)
            | WxError::DataNotAvailable(_) => 404,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for WxError {
    fn from(err: std::io::Error) -> Self {
        WxError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for WxError {
    fn from(err: serde_json::Error) -> Self {
        WxError::Internal(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for WxError {
    fn from(err: serde_yaml::Error) -> Self {
        WxError::Config(format!("YAML error: {}", err))
    }
}
