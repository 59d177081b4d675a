// Access token expiry inspection
//
// The token payload is decoded without verifying the signature. The expiry
// claim is only a scheduling hint for refresh; the server stays the
// authority on whether a token is actually valid.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Extract the `exp` claim (Unix seconds) from a JWT access token
pub fn decode_expiry(token: &str) -> Result<i64, ApiError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::TokenDecode("token has no payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ApiError::TokenDecode(format!("payload is not valid base64: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::TokenDecode(format!("payload is not a valid claims object: {e}")))?;

    Ok(claims.exp)
}

/// Seconds until the token expires, relative to `now`
pub fn remaining_seconds(token: &str, now: i64) -> Result<i64, ApiError> {
    Ok(decode_expiry(token)? - now)
}

/// Whether the token should be refreshed before use
/// An undecodable token counts as expiring
pub fn is_expiring(token: &str, threshold_secs: i64, now: i64) -> bool {
    match remaining_seconds(token, now) {
        Ok(remaining) => remaining < threshold_secs,
        Err(e) => {
            tracing::warn!("Treating undecodable access token as expiring: {}", e);
            true
        }
    }
}

/// Build an unsigned token carrying the given expiry
#[cfg(test)]
pub(crate) fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "id": "user-1", "email": "user@example.com", "exp": exp }).to_string(),
    );
    format!("{header}.{payload}.signature")
}
