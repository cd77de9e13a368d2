//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::features::InputError;
use crate::prediction::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Client errors
    ValidationError(String),
    NotFound(String),

    // Model errors
    ModelUnavailable(String),
    InferenceError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str(), None),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Model unavailable", Some(msg.as_str()))
            }
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", Some(msg.as_str()))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", Some(msg.as_str()))
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(e) => e.into(),
            PredictError::ModelUnavailable(msg) => AppError::ModelUnavailable(msg),
            PredictError::Inference(msg) => AppError::InferenceError(msg),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::ModelUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::InferenceError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_predict_error_mapping() {
        let err: AppError = PredictError::Validation(InputError::Empty).into();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == "No input data provided"));

        let err: AppError = PredictError::Inference("boom".into()).into();
        assert!(matches!(err, AppError::InferenceError(msg) if msg == "boom"));
    }
}
