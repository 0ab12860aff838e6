use crate::domain::{error::PaymentError, id::PaymentId, webhook::EventRecord};

pub async fn exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    payment_id: &PaymentId,
    event_type: &str,
) -> Result<bool, PaymentError> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM webhook_events WHERE payment_id = $1 AND event_type = $2)",
    )
    .bind(payment_id.as_str())
    .bind(event_type)
    .fetch_one(&mut **tx)
    .await?;

    Ok(found)
}

/// Record an applied event. The (payment_id, event_type) unique constraint
/// turns a lost race into a `Conflict`.
pub async fn insert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &EventRecord,
) -> Result<(), PaymentError> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO webhook_events (payment_id, event_type, raw_payload, processed_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (payment_id, event_type) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(record.payment_id.as_str())
    .bind(&record.event_type)
    .bind(&record.raw_payload)
    .bind(record.processed_at)
    .fetch_optional(&mut **tx)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err(PaymentError::Conflict(format!(
            "event {} already recorded for {}",
            record.event_type, record.payment_id
        ))),
    }
}
