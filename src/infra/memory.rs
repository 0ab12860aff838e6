use {
    crate::domain::{
        error::PaymentError,
        id::{IdempotencyToken, PaymentId},
        idempotency::IdempotencyRecord,
        payment::{Payment, PaymentStatus},
        store::{PaymentStore, StoreFuture, UnitOfWork},
        webhook::EventRecord,
    },
    chrono::{DateTime, Utc},
    std::{collections::HashMap, sync::Arc},
    tokio::sync::{Mutex, OwnedMutexGuard},
};

#[derive(Debug, Default)]
struct Tables {
    payments: HashMap<PaymentId, Payment>,
    idempotency: HashMap<IdempotencyToken, IdempotencyRecord>,
    events: HashMap<(PaymentId, String), EventRecord>,
}

/// In-process store. Units of work are fully serialized on one lock and an
/// uncommitted one leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn payment_count(&self) -> usize {
        self.tables.lock().await.payments.len()
    }

    pub async fn idempotency_count(&self) -> usize {
        self.tables.lock().await.idempotency.len()
    }

    pub async fn event_count(&self, payment_id: &PaymentId, event_type: &str) -> usize {
        let tables = self.tables.lock().await;
        usize::from(
            tables
                .events
                .contains_key(&(payment_id.clone(), event_type.to_string())),
        )
    }

    pub async fn events_for(&self, payment_id: &PaymentId) -> Vec<EventRecord> {
        let tables = self.tables.lock().await;
        let mut events: Vec<_> = tables
            .events
            .values()
            .filter(|e| &e.payment_id == payment_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.event_type.cmp(&b.event_type));
        events
    }
}

impl PaymentStore for MemoryStore {
    fn begin(&self) -> StoreFuture<'_, Box<dyn UnitOfWork>> {
        Box::pin(async move {
            let guard = self.tables.clone().lock_owned().await;
            Ok(Box::new(MemoryUnitOfWork {
                guard,
                pending: Tables::default(),
            }) as Box<dyn UnitOfWork>)
        })
    }
}

/// Holds the tables lock for its whole lifetime. Writes go to `pending` and
/// only reach the shared tables on `commit`; reads see `pending` first.
struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    pending: Tables,
}

impl MemoryUnitOfWork {
    fn payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.pending
            .payments
            .get(id)
            .or_else(|| self.guard.payments.get(id))
    }

    fn has_token(&self, token: &IdempotencyToken) -> bool {
        self.pending.idempotency.contains_key(token) || self.guard.idempotency.contains_key(token)
    }

    fn has_event(&self, key: &(PaymentId, String)) -> bool {
        self.pending.events.contains_key(key) || self.guard.events.contains_key(key)
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn lock<'a>(&'a mut self, _key: &'a str) -> StoreFuture<'a, ()> {
        // Already exclusive.
        Box::pin(async { Ok(()) })
    }

    fn find_idempotency<'a>(
        &'a mut self,
        token: &'a IdempotencyToken,
    ) -> StoreFuture<'a, Option<IdempotencyRecord>> {
        Box::pin(async move {
            Ok(self
                .pending
                .idempotency
                .get(token)
                .or_else(|| self.guard.idempotency.get(token))
                .cloned())
        })
    }

    fn insert_idempotency<'a>(&'a mut self, record: &'a IdempotencyRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if self.has_token(&record.token) {
                return Err(PaymentError::Conflict(format!(
                    "idempotency key already stored: {}",
                    record.token
                )));
            }
            self.pending
                .idempotency
                .insert(record.token.clone(), record.clone());
            Ok(())
        })
    }

    fn insert_payment<'a>(&'a mut self, payment: &'a Payment) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if self.payment(payment.id()).is_some() {
                return Err(PaymentError::IdCollision(payment.id().to_string()));
            }
            self.pending
                .payments
                .insert(payment.id().clone(), payment.clone());
            Ok(())
        })
    }

    fn find_payment<'a>(&'a mut self, id: &'a PaymentId) -> StoreFuture<'a, Option<Payment>> {
        Box::pin(async move { Ok(self.payment(id).cloned()) })
    }

    fn update_payment_status<'a>(
        &'a mut self,
        id: &'a PaymentId,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let next = self
                .payment(id)
                .ok_or_else(|| PaymentError::NotFound(format!("payment not found: {id}")))?
                .transition(status, at)?;
            self.pending.payments.insert(id.clone(), next);
            Ok(())
        })
    }

    fn event_exists<'a>(
        &'a mut self,
        payment_id: &'a PaymentId,
        event_type: &'a str,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.has_event(&(payment_id.clone(), event_type.to_string()))) })
    }

    fn insert_event<'a>(&'a mut self, record: &'a EventRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let key = (record.payment_id.clone(), record.event_type.clone());
            if self.has_event(&key) {
                return Err(PaymentError::Conflict(format!(
                    "event {} already recorded for {}",
                    record.event_type, record.payment_id
                )));
            }
            self.pending.events.insert(key, record.clone());
            Ok(())
        })
    }

    fn commit(self: Box<Self>) -> StoreFuture<'static, ()> {
        Box::pin(async move {
            let MemoryUnitOfWork { mut guard, pending } = *self;
            guard.payments.extend(pending.payments);
            guard.idempotency.extend(pending.idempotency);
            guard.events.extend(pending.events);
            Ok(())
        })
    }
}
