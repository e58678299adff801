//! Inspection of session tokens on the client side.
//!
//! The client cannot verify signatures of the tokens, so their claims are
//! only read to learn the user and the expiration time.

use jsonwebtoken::{DecodingKey, Validation};
use service::domain::user;

/// Reads claims of the provided `token` without verifying its signature.
///
/// Returns [`None`] if the `token` is malformed.
#[must_use]
pub fn decode(token: &str) -> Option<user::Session> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// Checks whether the provided `token` may no longer be used.
///
/// Malformed tokens are considered expired.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    decode(token).is_none_or(|claims| claims.expires_at.is_past())
}
