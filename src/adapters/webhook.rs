use {
    super::{api_errors::ApiError, run_detached},
    crate::{
        AppState,
        domain::{error::PaymentError, webhook::WebhookOutcome},
        services::webhooks::apply_webhook_event,
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
};

pub const SIGNATURE_HEADER: &str = "x-psp-signature";

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(outcome = tracing::field::Empty)
)]
pub async fn psp_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PaymentError::Unauthorized("missing X-PSP-Signature header".into()))?
        .to_string();

    let AppState {
        store, verifier, ..
    } = state;
    let outcome = run_detached(async move {
        apply_webhook_event(&*store, &verifier, &signature, &body).await
    })
    .await?;

    tracing::Span::current().record("outcome", outcome.as_str());
    if outcome == WebhookOutcome::Duplicate {
        tracing::info!("duplicate delivery, already processed");
    }

    Ok(Json(serde_json::json!({"status": outcome.as_str()})))
}
