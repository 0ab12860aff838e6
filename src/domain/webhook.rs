use {
    super::error::PaymentError,
    super::id::PaymentId,
    super::payment::PaymentStatus,
    chrono::{DateTime, Utc},
    serde::Deserialize,
};

pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const PAYMENT_FAILED: &str = "payment.failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Succeeded,
    Failed,
    /// Any other event type. Accepted and deduplicated, never transitions.
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => PAYMENT_SUCCEEDED,
            Self::Failed => PAYMENT_FAILED,
            Self::Other(s) => s,
        }
    }

    pub fn target_status(&self) -> Option<PaymentStatus> {
        match self {
            Self::Succeeded => Some(PaymentStatus::Succeeded),
            Self::Failed => Some(PaymentStatus::Failed),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            PAYMENT_SUCCEEDED => Self::Succeeded,
            PAYMENT_FAILED => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookBody {
    payment_id: String,
    event: String,
}

/// A processor notification after authentication and parsing.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub payment_id: PaymentId,
    pub kind: EventKind,
    pub raw_payload: String,
}

impl WebhookEvent {
    pub fn parse(raw: &[u8]) -> Result<Self, PaymentError> {
        let raw_payload = std::str::from_utf8(raw)
            .map_err(|_| PaymentError::BadPayload("body is not valid UTF-8".into()))?
            .to_string();
        let body: WebhookBody = serde_json::from_str(&raw_payload)
            .map_err(|e| PaymentError::BadPayload(e.to_string()))?;

        if body.event.trim().is_empty() {
            return Err(PaymentError::BadPayload("event must not be empty".into()));
        }
        let payment_id = PaymentId::new(body.payment_id)
            .map_err(|_| PaymentError::BadPayload("paymentId must not be empty".into()))?;

        Ok(Self {
            payment_id,
            kind: EventKind::from(body.event.as_str()),
            raw_payload,
        })
    }

    pub fn event_type(&self) -> &str {
        self.kind.as_str()
    }
}

/// Row of the event ledger, unique on (payment_id, event_type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub payment_id: PaymentId,
    pub event_type: String,
    pub raw_payload: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// (payment, event type) was already recorded. Nothing changed.
    Duplicate,
    Transitioned {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    /// Unrecognized event type on a pending payment. Recorded only.
    Inert,
    /// Payment was already terminal. Recorded only.
    Ignored { current: PaymentStatus },
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Transitioned { .. } => "transitioned",
            Self::Inert => "inert",
            Self::Ignored { .. } => "ignored",
        }
    }
}
