use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PaymentError;

const PAYMENT_ID_PREFIX: &str = "pl_";
const MAX_TOKEN_LEN: usize = 255;

/// Payment identifier (`pl_` + 32 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Fresh identifier backed by 122 random bits.
    pub fn generate() -> Self {
        Self(format!("{PAYMENT_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Wraps an identifier received from a caller. Lookups with a malformed
    /// id simply find nothing, so only emptiness is rejected here.
    pub fn new(id: impl Into<String>) -> Result<Self, PaymentError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PaymentError::Validation("payment id must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Client-supplied `Idempotency-Key` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyToken(String);

impl IdempotencyToken {
    pub fn new(token: impl Into<String>) -> Result<Self, PaymentError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(PaymentError::Validation(
                "idempotency key must not be empty".into(),
            ));
        }
        if token.chars().count() > MAX_TOKEN_LEN {
            return Err(PaymentError::Validation(format!(
                "idempotency key longer than {MAX_TOKEN_LEN} characters"
            )));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
