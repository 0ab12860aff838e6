use {
    super::id::IdempotencyToken,
    chrono::{DateTime, Utc},
};

/// Row of the idempotency ledger. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    pub token: IdempotencyToken,
    pub fingerprint: String,
    /// Exact JSON body returned on first use.
    pub response_body: String,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn matches(&self, fingerprint: &str) -> bool {
        self.fingerprint == fingerprint
    }
}
