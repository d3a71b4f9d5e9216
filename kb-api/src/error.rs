use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kb_messages::{msg, MESSAGES};
use kb_orchestrator::{SagaError, UnknownProcedure};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    /// Body that does not parse as workflow parameters.
    InvalidParams(JsonRejection),
    Saga(SagaError),
}

/// HTTP status a terminal saga failure is reported with.
pub fn saga_status(err: &SagaError) -> StatusCode {
    match err {
        SagaError::Configuration { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SagaError::PreconditionViolation { .. } => StatusCode::CONFLICT,
        SagaError::Authorization { .. } => StatusCode::BAD_GATEWAY,
        SagaError::Transient { .. } | SagaError::Cancelled { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::InvalidParams(rejection) => rejection.into_response(),
            ApiError::Saga(err) => {
                let body = json!({
                    "error": err.to_string(),
                    "code": err.code(),
                    "step": err.step(),
                    "outcome": err.outcome(),
                });
                (saga_status(&err), Json(body)).into_response()
            }
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidParams(rejection)
    }
}

impl From<UnknownProcedure> for ApiError {
    fn from(err: UnknownProcedure) -> Self {
        ApiError::NotFound(msg!(MESSAGES.worker.unknown_procedure, name = err.0))
    }
}
