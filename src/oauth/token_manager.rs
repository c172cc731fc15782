use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::Mutex;

use super::oauth_client::{self, AccessToken};
use crate::config::Credentials;

/// Owns the access token for one set of client credentials.
///
/// The token lives in a single slot. It is fetched when the slot is empty or
/// the token is about to expire, and reused for every request otherwise.
/// Failed authentication leaves the slot empty; it is never reported as an error.
pub struct TokenManager {
    http: reqwest::Client,
    token_endpoint: String,
    credentials: Credentials,
    expiry_skew: Duration,
    slot: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        token_endpoint: impl Into<String>,
        credentials: Credentials,
        expiry_skew: Duration,
    ) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.into(),
            credentials,
            expiry_skew,
            slot: Mutex::new(None),
        }
    }

    /// Requests a fresh token, replacing whatever the slot held.
    /// On failure, the slot ends up empty.
    pub async fn authenticate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = self.request_token().await;
    }

    /// Builds the headers for an API request, authenticating first if needed.
    ///
    /// The headers are produced even if authentication failed, with an empty
    /// bearer value; the API rejects those requests with a 401 of its own.
    pub async fn headers(&self) -> HeaderMap {
        // Holding the lock across authentication means concurrent callers
        // wait for a single token request instead of each issuing one.
        let mut slot = self.slot.lock().await;

        let stale = match slot.as_ref() {
            None => {
                tracing::debug!("access token not found, re-authenticating");
                true
            }
            Some(token) if token.is_expired(self.expiry_skew) => {
                tracing::debug!("access token expired, re-authenticating");
                true
            }
            Some(_) => false,
        };
        if stale {
            *slot = self.request_token().await;
        }

        bearer_headers(slot.as_ref().map(AccessToken::value).unwrap_or_default())
    }

    /// Empties the slot so the next request re-authenticates.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    /// Seeds the slot with a token obtained elsewhere.
    pub async fn set_token(&self, token: AccessToken) {
        *self.slot.lock().await = Some(token);
    }

    pub async fn current_token(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    async fn request_token(&self) -> Option<AccessToken> {
        tracing::debug!(
            client_id = %self.credentials.client_id,
            endpoint = %self.token_endpoint,
            "authenticating to get access token"
        );

        match oauth_client::obtain_access_token(&self.http, &self.token_endpoint, &self.credentials)
            .await
        {
            Ok(token) => {
                tracing::info!("access token retrieved");
                Some(token)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to retrieve access token");
                None
            }
        }
    }
}

/// `Authorization: Bearer <token>` plus a JSON content type.
fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    // A token with characters that can't go in a header is as good as no token.
    let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .unwrap_or_else(|_| HeaderValue::from_static("Bearer "));
    authorization.set_sensitive(true);

    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
