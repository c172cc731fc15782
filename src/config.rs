//! Client configuration and credentials.
//!
//! Everything can be set programmatically, or pulled from the environment:
//! - `HYPERPROOF_CLIENT_ID` / `HYPERPROOF_CLIENT_SECRET`: OAuth2 client credentials
//! - `HYPERPROOF_TOKEN_ENDPOINT`: token endpoint override
//! - `HYPERPROOF_API_BASE`: API base override (e.g. a staging tenant)
//! - `HYPERPROOF_TIMEOUT_SECS`: per-request timeout
//! - `HYPERPROOF_MAX_PAGES`: upper bound for paginated fetches

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{HyperproofError, Result};

/// The OAuth2 token endpoint used for the client-credentials grant.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.hyperproof.app/oauth/token";

/// Every resource lives beneath this base, e.g. `{base}/proof`.
pub const DEFAULT_API_BASE: &str = "https://api.hyperproof.app/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_PAGES: usize = 10_000;
const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// The client ID and secret issued for an API client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads `HYPERPROOF_CLIENT_ID` and `HYPERPROOF_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| HyperproofError::Config(format!("{key} is not set")))
        };

        Ok(Self::new(
            required("HYPERPROOF_CLIENT_ID")?,
            required("HYPERPROOF_CLIENT_SECRET")?,
        ))
    }
}

// The secret must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Endpoints and limits for an [`crate::ApiClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub token_endpoint: String,
    pub api_base: String,
    /// Applied to every outgoing request, including authentication.
    pub timeout: Duration,
    /// Paginated fetches give up after this many pages.
    pub max_pages: usize,
    /// Tokens this close to expiry are treated as already expired.
    pub expiry_skew: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
            expiry_skew: DEFAULT_EXPIRY_SKEW,
        }
    }
}

impl ClientConfig {
    /// Starts from the defaults and applies any `HYPERPROOF_*` overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("HYPERPROOF_TOKEN_ENDPOINT") {
            config = config.with_token_endpoint(endpoint);
        }
        if let Some(base) = lookup("HYPERPROOF_API_BASE") {
            config = config.with_api_base(base);
        }
        if let Some(secs) = lookup("HYPERPROOF_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|err| {
                HyperproofError::Config(format!("invalid HYPERPROOF_TIMEOUT_SECS: {err}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = lookup("HYPERPROOF_MAX_PAGES") {
            config.max_pages = pages.parse::<usize>().map_err(|err| {
                HyperproofError::Config(format!("invalid HYPERPROOF_MAX_PAGES: {err}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Trailing slashes are trimmed so resource paths can be appended as-is.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    /// Ensures both endpoints are absolute URLs and the page limit is usable.
    pub fn validate(&self) -> Result<()> {
        for candidate in [&self.token_endpoint, &self.api_base] {
            Url::parse(candidate).map_err(|source| HyperproofError::InvalidUrl {
                url: candidate.clone(),
                source,
            })?;
        }

        if self.max_pages == 0 {
            return Err(HyperproofError::Config(
                "max_pages must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The base URL for a single resource, e.g. `resource_base("proof")`.
    pub fn resource_base(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base, resource)
    }
}
