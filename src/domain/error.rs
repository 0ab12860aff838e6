use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad payload: {0}")]
    BadPayload(String),

    #[error("invalid status transition: {from} → {to}")]
    InvalidTransition { from: String, to: String },

    /// Freshly generated payment id already exists. Nothing was committed,
    /// so the caller may retry with the same idempotency token.
    #[error("payment id collision: {0}")]
    IdCollision(String),

    #[error("internal: {0}")]
    Internal(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
