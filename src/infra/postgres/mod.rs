pub mod event_repo;
pub mod idempotency_repo;
pub mod payment_repo;
pub mod store;

pub use store::PgStore;
