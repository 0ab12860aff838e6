use {
    crate::domain::{
        error::PaymentError,
        fingerprint::fingerprint,
        id::{IdempotencyToken, PaymentId},
        idempotency::IdempotencyRecord,
        payment::{CreatePaymentRequest, CreatePaymentResponse, Payment},
        store::PaymentStore,
    },
    chrono::Utc,
};

/// Result of `create_payment`. `body` is byte-for-byte what the first call
/// with this token returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPayment {
    pub body: String,
    pub replayed: bool,
}

impl CreatedPayment {
    pub fn response(&self) -> Result<CreatePaymentResponse, PaymentError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Create a payment under an idempotency token, or replay the stored
/// response when the token was already used for the same request.
///
/// The ledger lookup, the payment insert and the ledger write share one
/// unit of work, locked on the token, so concurrent callers with the same
/// token either replay or hit the ledger's uniqueness constraint.
pub async fn create_payment(
    store: &dyn PaymentStore,
    token: &IdempotencyToken,
    request: &CreatePaymentRequest,
) -> Result<CreatedPayment, PaymentError> {
    let request = request.validate()?;
    let fingerprint = fingerprint(&request)?;

    let mut uow = store.begin().await?;
    uow.lock(&format!("idempotency:{token}")).await?;

    if let Some(existing) = uow.find_idempotency(token).await? {
        if !existing.matches(&fingerprint) {
            tracing::warn!(idempotency_key = %token, "idempotency key reused with a different request");
            return Err(PaymentError::Conflict(
                "idempotency key used with a different request payload".into(),
            ));
        }
        tracing::info!(idempotency_key = %token, "idempotency key hit, replaying stored response");
        return Ok(CreatedPayment {
            body: existing.response_body,
            replayed: true,
        });
    }

    let now = Utc::now();
    let payment = Payment::new(PaymentId::generate(), request, now);
    uow.insert_payment(&payment).await?;

    let body = serde_json::to_string(&CreatePaymentResponse::from(&payment))?;
    let record = IdempotencyRecord {
        token: token.clone(),
        fingerprint,
        response_body: body.clone(),
        created_at: now,
    };
    uow.insert_idempotency(&record).await?;
    uow.commit().await?;

    tracing::info!(
        payment_id = %payment.id(),
        idempotency_key = %token,
        amount = %payment.money().amount(),
        currency = %payment.money().currency(),
        "payment created"
    );

    Ok(CreatedPayment {
        body,
        replayed: false,
    })
}

pub async fn get_payment(store: &dyn PaymentStore, id: &PaymentId) -> Result<Payment, PaymentError> {
    let mut uow = store.begin().await?;
    let payment = uow.find_payment(id).await?;
    uow.commit().await?;

    payment.ok_or_else(|| PaymentError::NotFound(format!("payment not found with id: {id}")))
}
