use {
    super::{api_errors::ApiError, run_detached},
    crate::{
        AppState,
        domain::{
            error::PaymentError,
            id::{IdempotencyToken, PaymentId},
            payment::{CreatePaymentRequest, PaymentView},
        },
        services::payments::{create_payment, get_payment},
    },
    axum::{
        Json,
        body::Bytes,
        extract::{Path, State},
        http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    },
};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
pub const IDEMPOTENT_REPLAYED_HEADER: HeaderName = HeaderName::from_static("idempotent-replayed");

#[tracing::instrument(
    name = "create_payment",
    skip_all,
    fields(idempotency_key = tracing::field::Empty)
)]
pub async fn create_payment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(PaymentError::MissingHeader("Idempotency-Key"))?;
    let token = IdempotencyToken::new(token)?;
    tracing::Span::current().record("idempotency_key", tracing::field::display(&token));

    let request: CreatePaymentRequest = serde_json::from_slice(&body)
        .map_err(|e| PaymentError::Validation(format!("invalid request body: {e}")))?;

    let store = state.store.clone();
    let created =
        run_detached(async move { create_payment(&*store, &token, &request).await }).await?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        created.body,
    )
        .into_response();
    if created.replayed {
        response
            .headers_mut()
            .insert(IDEMPOTENT_REPLAYED_HEADER, HeaderValue::from_static("true"));
    }
    Ok(response)
}

pub async fn get_payment_handler(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentView>, ApiError> {
    let id = PaymentId::new(payment_id)?;
    let payment = get_payment(&*state.store, &id).await?;
    tracing::debug!(payment_id = %id, status = %payment.status(), "payment retrieved");
    Ok(Json(PaymentView::from(&payment)))
}
