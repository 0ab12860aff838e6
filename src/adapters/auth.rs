use {
    super::api_errors::ApiError,
    crate::{AppState, domain::error::PaymentError},
    axum::{
        extract::{Request, State},
        middleware::Next,
        response::Response,
    },
    std::fmt,
    subtle::{Choice, ConstantTimeEq},
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Allow-list of pre-shared API keys.
#[derive(Clone)]
pub struct ApiKeys(Vec<String>);

impl ApiKeys {
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Compares against every key without short-circuiting.
    pub fn contains(&self, candidate: &str) -> bool {
        self.0
            .iter()
            .fold(Choice::from(0), |found, key| {
                found | key.as_bytes().ct_eq(candidate.as_bytes())
            })
            .into()
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKeys(<{} redacted>)", self.0.len())
    }
}

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::Unauthorized("missing X-API-Key header".into()))?;

    if !state.api_keys.contains(key) {
        tracing::warn!("rejected request with invalid API key");
        return Err(PaymentError::Unauthorized("invalid X-API-Key".into()).into());
    }

    Ok(next.run(request).await)
}
