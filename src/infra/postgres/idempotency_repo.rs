use {
    crate::domain::{error::PaymentError, id::IdempotencyToken, idempotency::IdempotencyRecord},
    chrono::{DateTime, Utc},
};

pub async fn find(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    token: &IdempotencyToken,
) -> Result<Option<IdempotencyRecord>, PaymentError> {
    let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT request_hash, response_body, created_at
        FROM idempotency_keys
        WHERE idempotency_key = $1
        "#,
    )
    .bind(token.as_str())
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(fingerprint, response_body, created_at)| IdempotencyRecord {
        token: token.clone(),
        fingerprint,
        response_body,
        created_at,
    }))
}

/// Write-once. A second insert for the same token is a `Conflict`.
pub async fn insert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &IdempotencyRecord,
) -> Result<(), PaymentError> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO idempotency_keys (idempotency_key, request_hash, response_body, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (idempotency_key) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(record.token.as_str())
    .bind(&record.fingerprint)
    .bind(&record.response_body)
    .bind(record.created_at)
    .fetch_optional(&mut **tx)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err(PaymentError::Conflict(format!(
            "idempotency key already stored: {}",
            record.token
        ))),
    }
}
