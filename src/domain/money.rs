use {
    super::error::PaymentError,
    rust_decimal::Decimal,
    serde::Serialize,
    std::fmt,
};

const MAX_CURRENCY_LEN: usize = 10;

/// Strictly positive, arbitrary-precision amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::Validation(format!(
                "amount must be positive, got: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Scale-independent form: `1999`, `1999.0` and `1999.00` all map to `"1999"`.
    pub fn canonical(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency code as supplied by the client. No conversion happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Currency {
    type Error = PaymentError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let code = s.trim();
        if code.is_empty() {
            return Err(PaymentError::Validation("currency must not be empty".into()));
        }
        if code.chars().count() > MAX_CURRENCY_LEN {
            return Err(PaymentError::Validation(format!(
                "currency longer than {MAX_CURRENCY_LEN} characters: {code}"
            )));
        }
        Ok(Self(code.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    amount: Amount,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Amount, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}
