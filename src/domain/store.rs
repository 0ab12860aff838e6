use {
    super::error::PaymentError,
    super::id::{IdempotencyToken, PaymentId},
    super::idempotency::IdempotencyRecord,
    super::payment::{Payment, PaymentStatus},
    super::webhook::EventRecord,
    chrono::{DateTime, Utc},
    std::{future::Future, pin::Pin},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PaymentError>> + Send + 'a>>;

/// Backing store for payments, the idempotency ledger and the event ledger.
pub trait PaymentStore: Send + Sync {
    /// Open an atomic unit of work.
    fn begin(&self) -> StoreFuture<'_, Box<dyn UnitOfWork>>;
}

/// One atomic region. Dropping it without `commit` rolls everything back.
pub trait UnitOfWork: Send {
    /// Serialize concurrent units of work on `key` until this one ends.
    fn lock<'a>(&'a mut self, key: &'a str) -> StoreFuture<'a, ()>;

    fn find_idempotency<'a>(
        &'a mut self,
        token: &'a IdempotencyToken,
    ) -> StoreFuture<'a, Option<IdempotencyRecord>>;

    /// Fails with `Conflict` if the token is already stored.
    fn insert_idempotency<'a>(&'a mut self, record: &'a IdempotencyRecord) -> StoreFuture<'a, ()>;

    /// Fails with `IdCollision` if the identifier is taken.
    fn insert_payment<'a>(&'a mut self, payment: &'a Payment) -> StoreFuture<'a, ()>;

    fn find_payment<'a>(&'a mut self, id: &'a PaymentId) -> StoreFuture<'a, Option<Payment>>;

    /// Fails with `InvalidTransition` unless the stored status is PENDING.
    fn update_payment_status<'a>(
        &'a mut self,
        id: &'a PaymentId,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;

    fn event_exists<'a>(
        &'a mut self,
        payment_id: &'a PaymentId,
        event_type: &'a str,
    ) -> StoreFuture<'a, bool>;

    /// Fails with `Conflict` if (payment_id, event_type) is already recorded.
    fn insert_event<'a>(&'a mut self, record: &'a EventRecord) -> StoreFuture<'a, ()>;

    fn commit(self: Box<Self>) -> StoreFuture<'static, ()>;
}
