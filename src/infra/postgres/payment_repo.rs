use {
    crate::domain::{
        error::PaymentError,
        id::PaymentId,
        payment::{Payment, PaymentParts, PaymentStatus},
    },
    chrono::{DateTime, Utc},
    rust_decimal::Decimal,
};

type Tx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    payment_id: String,
    amount: Decimal,
    currency: String,
    customer_email: String,
    reference: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = PaymentError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Payment::restore(PaymentParts {
            id: PaymentId::new(row.payment_id)?,
            amount: row.amount,
            currency: row.currency,
            customer_email: row.customer_email,
            reference: row.reference,
            status: PaymentStatus::try_from(row.status.as_str())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_payment(tx: &mut Tx<'_>, payment: &Payment) -> Result<(), PaymentError> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO payments
            (payment_id, amount, currency, customer_email, reference,
             status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (payment_id) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(payment.id().as_str())
    .bind(payment.money().amount().value())
    .bind(payment.money().currency().as_str())
    .bind(payment.customer_email().as_str())
    .bind(payment.reference())
    .bind(payment.status().as_str())
    .bind(payment.created_at())
    .bind(payment.updated_at())
    .fetch_optional(&mut **tx)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err(PaymentError::IdCollision(payment.id().to_string())),
    }
}

pub async fn find_payment(tx: &mut Tx<'_>, id: &PaymentId) -> Result<Option<Payment>, PaymentError> {
    let row = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT payment_id, amount, currency, customer_email, reference,
               status, created_at, updated_at
        FROM payments
        WHERE payment_id = $1
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(&mut **tx)
    .await?;

    row.map(Payment::try_from).transpose()
}

/// Only a PENDING row is updated; anything else is reported, not overwritten.
pub async fn update_payment_status(
    tx: &mut Tx<'_>,
    id: &PaymentId,
    status: PaymentStatus,
    at: DateTime<Utc>,
) -> Result<(), PaymentError> {
    if !PaymentStatus::Pending.can_transition_to(&status) {
        return Err(PaymentError::InvalidTransition {
            from: PaymentStatus::Pending.to_string(),
            to: status.to_string(),
        });
    }

    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = $2, updated_at = $3
        WHERE payment_id = $1 AND status = 'PENDING'
        "#,
    )
    .bind(id.as_str())
    .bind(status.as_str())
    .bind(at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let current: Option<String> =
        sqlx::query_scalar("SELECT status FROM payments WHERE payment_id = $1")
            .bind(id.as_str())
            .fetch_optional(&mut **tx)
            .await?;

    match current {
        None => Err(PaymentError::NotFound(format!("payment not found: {id}"))),
        Some(from) => Err(PaymentError::InvalidTransition {
            from,
            to: status.to_string(),
        }),
    }
}
