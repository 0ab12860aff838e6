use {
    super::{event_repo, idempotency_repo, payment_repo},
    crate::domain::{
        error::PaymentError,
        id::{IdempotencyToken, PaymentId},
        idempotency::IdempotencyRecord,
        payment::{Payment, PaymentStatus},
        store::{PaymentStore, StoreFuture, UnitOfWork},
        webhook::EventRecord,
    },
    chrono::{DateTime, Utc},
    sqlx::{PgPool, Postgres, Transaction},
};

/// Postgres-backed store. Every unit of work is one transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

impl PaymentStore for PgStore {
    fn begin(&self) -> StoreFuture<'_, Box<dyn UnitOfWork>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            sqlx::query("SET LOCAL lock_timeout = '5s'")
                .execute(&mut *tx)
                .await?;

            Ok(Box::new(PgUnitOfWork { tx }) as Box<dyn UnitOfWork>)
        })
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PgUnitOfWork {
    fn lock<'a>(&'a mut self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            // Works even when no row for `key` exists yet, and is released
            // automatically at commit or rollback.
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(key)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        })
    }

    fn find_idempotency<'a>(
        &'a mut self,
        token: &'a IdempotencyToken,
    ) -> StoreFuture<'a, Option<IdempotencyRecord>> {
        Box::pin(idempotency_repo::find(&mut self.tx, token))
    }

    fn insert_idempotency<'a>(&'a mut self, record: &'a IdempotencyRecord) -> StoreFuture<'a, ()> {
        Box::pin(idempotency_repo::insert(&mut self.tx, record))
    }

    fn insert_payment<'a>(&'a mut self, payment: &'a Payment) -> StoreFuture<'a, ()> {
        Box::pin(payment_repo::insert_payment(&mut self.tx, payment))
    }

    fn find_payment<'a>(&'a mut self, id: &'a PaymentId) -> StoreFuture<'a, Option<Payment>> {
        Box::pin(payment_repo::find_payment(&mut self.tx, id))
    }

    fn update_payment_status<'a>(
        &'a mut self,
        id: &'a PaymentId,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(payment_repo::update_payment_status(
            &mut self.tx,
            id,
            status,
            at,
        ))
    }

    fn event_exists<'a>(
        &'a mut self,
        payment_id: &'a PaymentId,
        event_type: &'a str,
    ) -> StoreFuture<'a, bool> {
        Box::pin(event_repo::exists(&mut self.tx, payment_id, event_type))
    }

    fn insert_event<'a>(&'a mut self, record: &'a EventRecord) -> StoreFuture<'a, ()> {
        Box::pin(event_repo::insert(&mut self.tx, record))
    }

    fn commit(self: Box<Self>) -> StoreFuture<'static, ()> {
        Box::pin(async move {
            self.tx.commit().await?;
            Ok::<_, PaymentError>(())
        })
    }
}
