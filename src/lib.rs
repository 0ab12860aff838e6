pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    adapters::auth::ApiKeys,
    domain::{signature::SignatureVerifier, store::PaymentStore},
    std::sync::Arc,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PaymentStore>,
    pub verifier: SignatureVerifier,
    pub api_keys: Arc<ApiKeys>,
}
