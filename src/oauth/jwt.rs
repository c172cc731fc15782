use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

/// We only care about when the token stops being valid.
#[derive(Deserialize)]
struct TokenClaims {
    exp: Option<u64>,
}

/// Reads the `exp` claim (seconds since the Unix epoch) from a JWT access token.
///
/// Access tokens are not required to be JWTs, so anything that fails to decode
/// simply yields `None`. Signatures are not checked here; the API does that.
pub fn expiry(token: &str) -> Option<u64> {
    // There's three components to a JWT: its header, its payload, and signature.
    let mut components = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        components.next(),
        components.next(),
        components.next(),
        components.next(),
    ) else {
        return None;
    };

    // Some issuers pad their segments regardless.
    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&decoded).ok()?;
    claims.exp
}
