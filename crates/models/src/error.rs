use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire shape for error responses. The service has always answered
/// failures with a single-field JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GeoRiskError {
    // Build-time failures (image assembly). All fatal, never retried.
    #[error("Build input missing: {path}")]
    BuildInputMissing { path: String },

    #[error("Image build failed: {reason}")]
    BuildFailed { reason: String },

    #[error("Container engine error: {message}")]
    DockerError { message: String },

    #[error("Runtime contract violated: {reason}")]
    ContractViolation { reason: String },

    // Startup failures. Fatal; the supervisor restarts the process.
    #[error("PORT environment variable is not set")]
    PortMissing,

    #[error("PORT environment variable is not a valid port: {value}")]
    PortInvalid { value: String },

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // Dataset and model failures.
    #[error("Failed to load {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("Unsupported coordinate reference system: EPSG:{code}")]
    UnsupportedCrs { code: u32 },

    #[error("Machine learning models are not loaded on the server")]
    ModelUnavailable,

    // Request-level failures.
    #[error("Missing or invalid coordinates")]
    InvalidCoordinates,

    #[error("Prediction failed: {reason}")]
    PredictionFailed { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Internal server error: {reason}")]
    InternalError { reason: String },
}

impl GeoRiskError {
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoRiskError::BuildInputMissing { .. } => "MissingBuildInput",
            GeoRiskError::BuildFailed { .. } => "BuildResolutionFailure",
            GeoRiskError::DockerError { .. } => "ContainerEngineError",
            GeoRiskError::ContractViolation { .. } => "ContractViolation",
            GeoRiskError::PortMissing | GeoRiskError::PortInvalid { .. } => "StartupFailure",
            GeoRiskError::ConfigError { .. } => "ConfigurationError",
            GeoRiskError::DataLoad { .. } => "DataLoadError",
            GeoRiskError::UnsupportedCrs { .. } => "DataLoadError",
            GeoRiskError::ModelUnavailable => "ModelUnavailable",
            GeoRiskError::InvalidCoordinates => "InvalidParameter",
            GeoRiskError::PredictionFailed { .. } => "PredictionError",
            GeoRiskError::InvalidRequest { .. } => "InvalidParameter",
            GeoRiskError::InternalError { .. } => "ServiceError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            GeoRiskError::InvalidCoordinates => 400,
            GeoRiskError::InvalidRequest { .. } => 400,
            GeoRiskError::PredictionFailed { .. } => 400,
            GeoRiskError::ModelUnavailable => 503,
            _ => 500,
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_client_statuses() {
        assert_eq!(GeoRiskError::InvalidCoordinates.http_status(), 400);
        assert_eq!(GeoRiskError::ModelUnavailable.http_status(), 503);
        assert_eq!(
            GeoRiskError::PredictionFailed {
                reason: "bad feature".into()
            }
            .http_status(),
            400
        );
    }

    #[test]
    fn error_body_carries_the_display_message() {
        let body = GeoRiskError::InvalidCoordinates.to_error_body();
        assert_eq!(body.error, "Missing or invalid coordinates");
    }
}
