use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::pagination::{collect_pages, PageBatch};
use super::request::{Multipart, QueryParams, RequestSpec};
use super::response::{self, ResponseEnvelope};
use crate::config::{ClientConfig, Credentials};
use crate::error::Result;
use crate::oauth::TokenManager;

/// An authenticated client for the Hyperproof API.
///
/// Every verb method attaches fresh headers from the [`TokenManager`], so a
/// token that goes missing or expires mid-session is replaced transparently.
/// Failures never surface as errors here: transport problems and HTTP 4xx/5xx
/// responses come back as [`ResponseEnvelope::Absent`] (and are logged).
pub struct ApiClient {
    http: reqwest::Client,
    tokens: TokenManager,
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a client that authenticates on its first request.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let tokens = TokenManager::new(
            http.clone(),
            config.token_endpoint.clone(),
            credentials,
            config.expiry_skew,
        );

        Ok(Self {
            http,
            tokens,
            config,
        })
    }

    /// Creates a client and authenticates right away.
    ///
    /// A failed authentication is logged, not returned; the client is still
    /// usable and will try again on its first request.
    pub async fn connect(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        tracing::debug!(client_id = %credentials.client_id, "initializing API client");
        let client = Self::new(credentials, config)?;
        client.tokens.authenticate().await;
        Ok(client)
    }

    /// Reads credentials and configuration from `HYPERPROOF_*` variables.
    pub async fn from_env() -> Result<Self> {
        Self::connect(Credentials::from_env()?, ClientConfig::from_env()?).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn get(
        &self,
        base: &str,
        path: &str,
        params: QueryParams,
        raw: bool,
    ) -> ResponseEnvelope {
        self.send(
            RequestSpec::new(Method::GET, base, path)
                .query(params)
                .raw(raw),
        )
        .await
    }

    /// Sends `files` as multipart when there are any; `data` is ignored in that case.
    pub async fn post(
        &self,
        base: &str,
        path: &str,
        data: Option<Value>,
        files: Option<Multipart>,
        raw: bool,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Method::POST, base, path).raw(raw);

        let spec = match (files.filter(Multipart::has_files), data) {
            (Some(files), data) => {
                if data.is_some() {
                    tracing::debug!("files supplied, not sending JSON body");
                }
                spec.multipart(files)
            }
            (None, Some(data)) => spec.json(data),
            (None, None) => spec,
        };

        self.send(spec).await
    }

    pub async fn put(
        &self,
        base: &str,
        path: &str,
        data: Option<Value>,
        raw: bool,
    ) -> ResponseEnvelope {
        self.send(with_json(RequestSpec::new(Method::PUT, base, path), data).raw(raw))
            .await
    }

    pub async fn patch(
        &self,
        base: &str,
        path: &str,
        data: Option<Value>,
        raw: bool,
    ) -> ResponseEnvelope {
        self.send(with_json(RequestSpec::new(Method::PATCH, base, path), data).raw(raw))
            .await
    }

    pub async fn delete(&self, base: &str, path: &str, raw: bool) -> ResponseEnvelope {
        self.send(RequestSpec::new(Method::DELETE, base, path).raw(raw))
            .await
    }

    /// Sends `spec` and normalizes the response.
    ///
    /// A 401 means the token was rejected; the token is discarded and the
    /// request is re-sent once with freshly acquired headers.
    pub async fn send(&self, spec: RequestSpec) -> ResponseEnvelope {
        let mut retried = false;

        loop {
            let headers = self.tokens.headers().await;
            let request = match spec.build(&self.http, headers) {
                Ok(request) => request,
                Err(err) => {
                    tracing::error!(
                        method = %spec.method,
                        url = %spec.url,
                        error = %err,
                        "unable to build request"
                    );
                    return ResponseEnvelope::Absent;
                }
            };

            tracing::debug!(method = %spec.method, url = %request.url(), "sending request");
            let response = match self.http.execute(request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(
                        method = %spec.method,
                        url = %spec.url,
                        error = %err,
                        "request failed"
                    );
                    return ResponseEnvelope::Absent;
                }
            };

            let status = response.status();
            tracing::debug!(method = %spec.method, url = %spec.url, %status, "received response");

            if status == StatusCode::UNAUTHORIZED && !retried {
                tracing::warn!(
                    method = %spec.method,
                    url = %spec.url,
                    "access token rejected, re-authenticating"
                );
                retried = true;
                self.tokens.invalidate().await;
                continue;
            }

            return response::normalize(response, spec.raw).await;
        }
    }

    /// GETs every page of a listing that paginates with `nextToken` /
    /// `continuationToken`, returning the concatenated `data` records.
    ///
    /// `operation` names the listing in errors and logs.
    pub async fn get_all_pages(
        &self,
        base: &str,
        path: &str,
        params: QueryParams,
        operation: &str,
    ) -> Result<Vec<Value>> {
        collect_pages(operation, self.config.max_pages, |token| {
            let mut params = params.clone();
            params.insert("nextToken", token);
            async move { PageBatch::from_envelope(self.get(base, path, params, false).await) }
        })
        .await
    }
}

fn with_json(spec: RequestSpec, data: Option<Value>) -> RequestSpec {
    match data {
        Some(data) => spec.json(data),
        None => spec,
    }
}
