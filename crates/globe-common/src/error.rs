//! Error types for the globe viewer.

use thiserror::Error;

/// Result type alias using GlobeError.
pub type GlobeResult<T> = Result<T, GlobeError>;

/// Primary error type for grid loading and scene building.
#[derive(Debug, Error)]
pub enum GlobeError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Layer '{layer}' not found in panel {panel}")]
    LayerNotFound { panel: usize, layer: String },

    #[error("Panel {panel} out of range (scene has {count} panels)")]
    PanelOutOfRange { panel: usize, count: usize },

    // === Data Errors ===
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Asset not available: {0}")]
    AssetError(String),

    // === Configuration Errors ===
    #[error("Grid shape {actual:?} incompatible with panel layout (expected {expected:?})")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // === Rendering Errors ===
    #[error("Scene build failed: {0}")]
    SceneBuildError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GlobeError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GlobeError::InvalidParameter { .. } => 400,

            GlobeError::SceneNotFound(_)
            | GlobeError::SessionNotFound(_)
            | GlobeError::LayerNotFound { .. }
            | GlobeError::PanelOutOfRange { .. } => 404,

            _ => 500,
        }
    }

    /// Whether the error stems from configuration rather than the request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GlobeError::ShapeMismatch { .. } | GlobeError::ConfigError(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for GlobeError {
    fn from(err: std::io::Error) -> Self {
        GlobeError::DataReadError(err.to_string())
    }
}

impl From<serde_json::Error> for GlobeError {
    fn from(err: serde_json::Error) -> Self {
        GlobeError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GlobeError::SceneNotFound("planet".into()).http_status_code(), 404);
        assert_eq!(
            GlobeError::InvalidParameter {
                param: "visible".into(),
                message: "not a bool".into()
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            GlobeError::ShapeMismatch {
                expected: (4, 4),
                actual: (3, 4)
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_io_error_maps_to_data_read() {
        let err: GlobeError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, GlobeError::DataReadError(_)));
        assert!(!err.is_configuration_error());
    }
}
