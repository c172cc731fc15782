use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde_json::{Map, Value};

/// What a request produced.
///
/// `Absent` means the call failed (transport error or HTTP 4xx/5xx).
/// A successful response that isn't usable JSON becomes an *empty* `Json`
/// object instead, so "the call failed" and "the call returned nothing
/// useful" stay distinguishable.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseEnvelope {
    Json(Value),
    Text(String),
    Absent,
}

impl ResponseEnvelope {
    /// The empty mapping handed out for non-JSON or unparsable bodies.
    pub fn empty() -> Self {
        Self::Json(Value::Object(Map::new()))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True for an empty JSON object or array.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Reads the body of `response` and interprets it. Never fails.
pub(crate) async fn normalize(response: reqwest::Response, raw: bool) -> ResponseEnvelope {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(%status, error = %err, "unable to read response body");
            return ResponseEnvelope::Absent;
        }
    };

    interpret(status, content_type.as_deref(), body, raw)
}

/// Decides what a response means from its status, content type and body.
pub(crate) fn interpret(
    status: StatusCode,
    content_type: Option<&str>,
    body: String,
    raw: bool,
) -> ResponseEnvelope {
    if status.is_client_error() || status.is_server_error() {
        tracing::error!(%status, %body, "HTTP error occurred");
        return ResponseEnvelope::Absent;
    }

    if raw {
        return ResponseEnvelope::Text(body);
    }

    let content_type = content_type.unwrap_or_default();
    if !content_type.contains("application/json") {
        // Bodyless successes (e.g. 204 on delete) are expected to land here.
        if body.is_empty() {
            tracing::debug!(%status, "response has no body");
        } else {
            tracing::warn!(%status, content_type, "unexpected content type");
        }
        return ResponseEnvelope::empty();
    }

    match serde_json::from_str(&body) {
        Ok(value) => ResponseEnvelope::Json(value),
        Err(err) => {
            tracing::warn!(%status, error = %err, "error parsing JSON");
            ResponseEnvelope::empty()
        }
    }
}
