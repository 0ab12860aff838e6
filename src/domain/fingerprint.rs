use {
    super::error::PaymentError,
    super::payment::PaymentRequest,
    serde::Serialize,
    sha2::{Digest, Sha256},
};

/// Canonical form of a creation request. Field order here is the
/// serialization order and must not change, or stored fingerprints stop
/// matching.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Canonical<'a> {
    amount: String,
    currency: &'a str,
    customer_email: &'a str,
    reference: Option<&'a str>,
}

/// Hex SHA-256 of the request's semantic fields.
pub fn fingerprint(request: &PaymentRequest) -> Result<String, PaymentError> {
    let canonical = Canonical {
        amount: request.money().amount().canonical(),
        currency: request.money().currency().as_str(),
        customer_email: request.customer_email().as_str(),
        reference: request.reference(),
    };
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
