use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised while loading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Failed to read reasoning tables from {path}: {source}")]
    TablesRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse reasoning tables: {0}")]
    TablesParse(#[from] serde_json::Error),

    #[error("Severity tables must contain an 'Other' table")]
    MissingFallbackTable,

    #[error("The 'Other' severity table has no amount for band {0}")]
    IncompleteFallbackTable(&'static str),

    #[error("Unknown ACV band '{label}' in severity table '{loss_type}'")]
    UnknownAcvBand { loss_type: String, label: String },

    #[error("Invalid amount {amount} for band {label} in severity table '{loss_type}'")]
    InvalidAmount {
        loss_type: String,
        label: &'static str,
        amount: f64,
    },

    #[error("Reserve modifier {name} must lie in [0, 1], got {fraction}")]
    InvalidModifier { name: &'static str, fraction: f64 },

    #[error("Unknown fraud indicator '{0}'")]
    UnknownFraudIndicator(String),

    #[error("Fraud weight for {name} must lie in [0, 1], got {weight}")]
    InvalidFraudWeight { name: &'static str, weight: f64 },
}

/// Failure of the pipeline machinery itself, never of the request contents
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] graph_flow::GraphError),
}

/// HTTP-facing error, rendered as `{ "error", "message" }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error_type(),
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}
