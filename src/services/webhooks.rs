use {
    crate::domain::{
        error::PaymentError,
        payment::EventAction,
        signature::SignatureVerifier,
        store::PaymentStore,
        webhook::{EventRecord, WebhookEvent, WebhookOutcome},
    },
    chrono::Utc,
};

/// Authenticate, parse and apply a processor notification.
///
/// The signature is checked against the raw bytes before anything is
/// parsed or read from the store.
pub async fn apply_webhook_event(
    store: &dyn PaymentStore,
    verifier: &SignatureVerifier,
    signature: &str,
    raw_payload: &[u8],
) -> Result<WebhookOutcome, PaymentError> {
    if !verifier.verify(signature, raw_payload) {
        return Err(PaymentError::Unauthorized("invalid webhook signature".into()));
    }

    let event = WebhookEvent::parse(raw_payload)?;
    apply_event(store, &event).await
}

/// Dedup, state machine, and event ledger write in one unit of work locked
/// on the payment. Every first delivery is recorded, including inert ones.
pub async fn apply_event(
    store: &dyn PaymentStore,
    event: &WebhookEvent,
) -> Result<WebhookOutcome, PaymentError> {
    let mut uow = store.begin().await?;
    uow.lock(&format!("payment:{}", event.payment_id)).await?;

    if uow.event_exists(&event.payment_id, event.event_type()).await? {
        return Ok(WebhookOutcome::Duplicate);
    }

    let payment = uow.find_payment(&event.payment_id).await?.ok_or_else(|| {
        PaymentError::NotFound(format!("payment not found for webhook: {}", event.payment_id))
    })?;

    let now = Utc::now();
    let outcome = match payment.decide(&event.kind) {
        EventAction::Advance { to } => {
            uow.update_payment_status(payment.id(), to, now).await?;
            WebhookOutcome::Transitioned {
                from: payment.status(),
                to,
            }
        }
        EventAction::Inert => WebhookOutcome::Inert,
        EventAction::Terminal { current } => WebhookOutcome::Ignored { current },
    };

    let record = EventRecord {
        payment_id: event.payment_id.clone(),
        event_type: event.event_type().to_string(),
        raw_payload: event.raw_payload.clone(),
        processed_at: now,
    };
    uow.insert_event(&record).await?;
    uow.commit().await?;

    match &outcome {
        WebhookOutcome::Transitioned { from, to } => tracing::info!(
            payment_id = %event.payment_id,
            event_type = %event.event_type(),
            %from,
            %to,
            "payment status changed"
        ),
        WebhookOutcome::Ignored { current } => tracing::info!(
            payment_id = %event.payment_id,
            event_type = %event.event_type(),
            %current,
            "payment already terminal, event recorded only"
        ),
        other => tracing::info!(
            payment_id = %event.payment_id,
            event_type = %event.event_type(),
            outcome = other.as_str(),
            "event recorded"
        ),
    }

    Ok(outcome)
}
