use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sonar_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// The upstream answered with a non-2xx status other than 404.
    #[error("External API error: {provider} API error {status}: {body}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid upstream data: {0}")]
    InvalidData(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidWallet(_) => "INVALID_WALLET",
            AppError::InvalidParam(_) => "INVALID_PARAM",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ExternalApi(_) | AppError::UpstreamStatus { .. } => "EXTERNAL_API_ERROR",
            AppError::InvalidData(_) => "INVALID_DATA",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidWallet(_) | AppError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApi(_) | AppError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            AppError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        match &self {
            AppError::InvalidWallet(wallet) => {
                tracing::warn!(wallet = %wallet, error_code = code, "Invalid wallet address");
            }
            AppError::InvalidParam(param) => {
                tracing::warn!(param = %param, error_code = code, "Invalid parameter");
            }
            AppError::NotFound(what) => {
                tracing::info!(what = %what, error_code = code, "Resource not found");
            }
            AppError::ExternalApi(msg) => {
                tracing::error!(message = %msg, error_code = code, "External API error");
            }
            AppError::UpstreamStatus { provider, status, body } => {
                tracing::error!(provider, upstream_status = %status, body = %body, error_code = code, "External API error");
            }
            AppError::InvalidData(e) => {
                tracing::warn!(error = %e, error_code = code, "Upstream data failed validation");
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, error_code = code, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, error_code = code, "Internal error occurred");
            }
        }

        tracing::debug!(
            status_code = %status.as_u16(),
            error_code = %code,
            error_message = %self,
            "Returning error response"
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
