use crate::domain::error::PaymentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can implement axum's `IntoResponse`.
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self.0 {
            PaymentError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
            }
            PaymentError::BadPayload(msg) => (StatusCode::BAD_REQUEST, "bad_payload", msg),
            err @ PaymentError::MissingHeader(_) => {
                (StatusCode::BAD_REQUEST, "missing_header", err.to_string())
            }
            PaymentError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            PaymentError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            PaymentError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            err @ PaymentError::InvalidTransition { .. } => {
                tracing::warn!("{err}");
                (StatusCode::CONFLICT, "invalid_transition", err.to_string())
            }
            PaymentError::IdCollision(id) => {
                tracing::warn!(payment_id = %id, "generated payment id collided");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "retryable",
                    "temporary failure, retry with the same idempotency key".to_string(),
                )
            }
            err @ (PaymentError::Internal(_)
            | PaymentError::Database(_)
            | PaymentError::Serialization(_)) => {
                tracing::error!("{err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now(),
        });

        (status, Json(body)).into_response()
    }
}
