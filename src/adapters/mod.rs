pub mod api_errors;
pub mod auth;
pub mod correlation;
pub mod payments;
pub mod router;
pub mod webhook;

use {crate::domain::error::PaymentError, std::future::Future, tracing::Instrument};

/// Run a unit of work on its own task so that a client disconnect or a
/// request timeout cannot drop it between statements. It either commits or
/// rolls back on its own.
pub(crate) async fn run_detached<T, F>(work: F) -> Result<T, PaymentError>
where
    F: Future<Output = Result<T, PaymentError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work.in_current_span())
        .await
        .map_err(|e| PaymentError::Internal(format!("unit of work task failed: {e}")))?
}
