pub mod error;
pub mod fingerprint;
pub mod id;
pub mod idempotency;
pub mod money;
pub mod payment;
pub mod signature;
pub mod store;
pub mod webhook;
