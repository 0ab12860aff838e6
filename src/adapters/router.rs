use {
    super::{
        auth::require_api_key,
        correlation::correlation_id,
        payments::{create_payment_handler, get_payment_handler},
        webhook::psp_webhook_handler,
    },
    crate::AppState,
    axum::{
        Router,
        extract::DefaultBodyLimit,
        middleware,
        routing::{get, post},
    },
    std::time::Duration,
    tower_http::timeout::TimeoutLayer,
};

const BODY_LIMIT: usize = 64 * 1024;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let payments = Router::new()
        .route("/api/v1/payments", post(create_payment_handler))
        .route("/api/v1/payments/{payment_id}", get(get_payment_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/v1/webhooks/psp", post(psp_webhook_handler))
        .merge(payments)
        .layer(middleware::from_fn(correlation_id))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
