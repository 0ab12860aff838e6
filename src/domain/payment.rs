use {
    super::error::PaymentError,
    super::id::PaymentId,
    super::money::{Amount, Currency, Money},
    super::webhook::EventKind,
    chrono::{DateTime, Utc},
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    std::fmt,
};

const MAX_REFERENCE_LEN: usize = 255;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only PENDING → SUCCEEDED and PENDING → FAILED exist.
    pub fn can_transition_to(&self, next: &PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Succeeded) | (Self::Pending, Self::Failed)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = PaymentError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SUCCEEDED" => Ok(Self::Succeeded),
            "FAILED" => Ok(Self::Failed),
            other => Err(PaymentError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CustomerEmail(String);

impl CustomerEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CustomerEmail {
    type Error = PaymentError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let email = s.trim();
        let invalid = || PaymentError::Validation(format!("invalid customer email: {email}"));

        if email.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        let labels_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
        if !labels_ok {
            return Err(invalid());
        }
        Ok(Self(email.to_string()))
    }
}

/// Body of `POST /api/v1/payments` as it arrives on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// JSON numbers are read digit for digit, never through `f64`.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: String,
    pub customer_email: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<PaymentRequest, PaymentError> {
        let amount = Amount::new(self.amount)?;
        let currency = Currency::try_from(self.currency.as_str())?;
        let customer_email = CustomerEmail::try_from(self.customer_email.as_str())?;
        let reference = match self.reference.as_deref() {
            Some(r) if r.chars().count() > MAX_REFERENCE_LEN => {
                return Err(PaymentError::Validation(format!(
                    "reference longer than {MAX_REFERENCE_LEN} characters"
                )));
            }
            other => other.map(str::to_string),
        };

        Ok(PaymentRequest {
            money: Money::new(amount, currency),
            customer_email,
            reference,
        })
    }
}

/// Validated creation request. The fingerprint is computed from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    money: Money,
    customer_email: CustomerEmail,
    reference: Option<String>,
}

impl PaymentRequest {
    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn customer_email(&self) -> &CustomerEmail {
        &self.customer_email
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// What the engine decides to do with an event for a given payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Advance { to: PaymentStatus },
    /// Payment is pending but the event type carries no transition.
    Inert,
    /// Payment already left PENDING; nothing is re-applied.
    Terminal { current: PaymentStatus },
}

/// Column values as stored, for rebuilding a `Payment` in a repository.
pub struct PaymentParts {
    pub id: PaymentId,
    pub amount: Decimal,
    pub currency: String,
    pub customer_email: String,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment is an immutable value; transitions produce a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    id: PaymentId,
    money: Money,
    customer_email: CustomerEmail,
    reference: Option<String>,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(id: PaymentId, request: PaymentRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            money: request.money,
            customer_email: request.customer_email,
            reference: request.reference,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(parts: PaymentParts) -> Result<Self, PaymentError> {
        Ok(Self {
            id: parts.id,
            money: Money::new(
                Amount::new(parts.amount)?,
                Currency::try_from(parts.currency.as_str())?,
            ),
            customer_email: CustomerEmail::try_from(parts.customer_email.as_str())?,
            reference: parts.reference,
            status: parts.status,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    pub fn id(&self) -> &PaymentId {
        &self.id
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn customer_email(&self) -> &CustomerEmail {
        &self.customer_email
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn decide(&self, event: &EventKind) -> EventAction {
        if self.status.is_terminal() {
            return EventAction::Terminal {
                current: self.status,
            };
        }
        match event.target_status() {
            Some(to) => EventAction::Advance { to },
            None => EventAction::Inert,
        }
    }

    pub fn transition(&self, to: PaymentStatus, at: DateTime<Utc>) -> Result<Payment, PaymentError> {
        if !self.status.can_transition_to(&to) {
            return Err(PaymentError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Payment {
            status: to,
            updated_at: at,
            ..self.clone()
        })
    }
}

/// Response of a successful creation. Its serialized form is what the
/// idempotency ledger replays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub payment_id: String,
    pub status: PaymentStatus,
}

impl From<&Payment> for CreatePaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            payment_id: p.id.as_str().to_string(),
            status: p.status,
        }
    }
}

/// Full representation returned by `GET /api/v1/payments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub payment_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub customer_email: String,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentView {
    fn from(p: &Payment) -> Self {
        Self {
            payment_id: p.id.as_str().to_string(),
            amount: p.money.amount().value(),
            currency: p.money.currency().as_str().to_string(),
            customer_email: p.customer_email.as_str().to_string(),
            reference: p.reference.clone(),
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
