use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde_json::Value;
use thiserror::Error;

use super::jwt;
use crate::api::{response, ResponseEnvelope};
use crate::config::Credentials;

/// Reasons a token request did not produce a token.
/// These are logged by the token manager and never leave the crate.
#[derive(Debug, Error)]
pub(crate) enum TokenRequestError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("token response did not contain an access_token")]
    MissingToken,
}

/// A bearer token along with when we believe it stops working.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    issued_at: Instant,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Option<Instant>) -> Self {
        Self {
            value: value.into(),
            issued_at: Instant::now(),
            expires_at,
        }
    }

    /// Derives an expiry from `expires_in` when the server sent one,
    /// and otherwise from the token's own `exp` claim.
    pub(crate) fn issued(value: String, expires_in: Option<u64>) -> Self {
        let now = Instant::now();
        let expires_at = match expires_in {
            Some(seconds) => now.checked_add(Duration::from_secs(seconds)),
            None => jwt::expiry(&value).and_then(|exp| {
                let unix_now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_secs())
                    .unwrap_or_default();
                now.checked_add(Duration::from_secs(exp.saturating_sub(unix_now)))
            }),
        };

        Self {
            value,
            issued_at: now,
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Tokens without a known expiry never expire on our side;
    /// the API rejecting them is what prompts re-authentication.
    ///
    /// `skew` is capped at half the token's lifetime, so a short-lived token
    /// is still used for a while before it counts as expired.
    pub fn is_expired(&self, skew: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        let lifetime = expires_at.saturating_duration_since(self.issued_at);
        let skew = skew.min(lifetime / 2);

        Instant::now()
            .checked_add(skew)
            .map_or(true, |deadline| deadline >= expires_at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Performs the OAuth2 client-credentials grant against `token_endpoint`.
pub(crate) async fn obtain_access_token(
    http: &reqwest::Client,
    token_endpoint: &str,
    credentials: &Credentials,
) -> Result<AccessToken, TokenRequestError> {
    let result = http
        .post(token_endpoint)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = result.status();
    let content_type = result
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = result.text().await?;
    tracing::debug!(%status, "token endpoint responded");

    // Only a plain 200 counts; anything else leaves us without a token.
    if status != StatusCode::OK {
        return Err(TokenRequestError::Rejected { status, body });
    }

    // The token response goes through the same content-type rules as any other.
    let ResponseEnvelope::Json(payload) =
        response::interpret(status, content_type.as_deref(), body, false)
    else {
        return Err(TokenRequestError::MissingToken);
    };

    let Some(token) = payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
    else {
        return Err(TokenRequestError::MissingToken);
    };
    let expires_in = payload.get("expires_in").and_then(Value::as_u64);

    Ok(AccessToken::issued(token.to_string(), expires_in))
}
