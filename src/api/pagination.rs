use std::collections::HashSet;
use std::future::Future;

use serde_json::Value;

use super::ResponseEnvelope;
use crate::error::{HyperproofError, Result};

/// One page of a paginated listing.
#[derive(Clone, Debug, PartialEq)]
pub struct PageBatch<T = Value> {
    pub data: Vec<T>,
    /// Absent (or empty) once the server has nothing more to give.
    pub continuation_token: Option<String>,
}

impl PageBatch<Value> {
    /// Pulls `data` and `continuationToken` out of a parsed page.
    ///
    /// Returns `None` when the page is absent, has no `data` array, or
    /// carries a continuation token that isn't a string.
    pub fn from_envelope(envelope: ResponseEnvelope) -> Option<Self> {
        let ResponseEnvelope::Json(Value::Object(mut page)) = envelope else {
            return None;
        };
        let Value::Array(data) = page.remove("data")? else {
            return None;
        };
        let continuation_token = match page.remove("continuationToken") {
            Some(Value::String(token)) => Some(token),
            None | Some(Value::Null) => None,
            Some(other) => {
                tracing::error!(token = %other, "continuation token is not a string");
                return None;
            }
        };

        Some(Self {
            data,
            continuation_token,
        })
    }
}

/// Repeatedly calls `fetch` with the previous page's continuation token,
/// concatenating every page's records in the order the server returned them.
///
/// The first call receives `None`. The loop ends at the first page without a
/// continuation token. A missing page is an error rather than a short result,
/// as are a server that hands back a token it has already given out and a
/// listing that runs past `max_pages`.
pub async fn collect_pages<T, F, Fut>(
    operation: &str,
    max_pages: usize,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Option<PageBatch<T>>>,
{
    let mut records = Vec::new();
    let mut token: Option<String> = None;
    let mut sent = HashSet::new();

    for page in 1..=max_pages {
        let Some(batch) = fetch(token.clone()).await else {
            return Err(HyperproofError::PaginationIntegrity {
                operation: operation.to_string(),
            });
        };

        tracing::debug!(operation, page, records = batch.data.len(), "fetched page");
        records.extend(batch.data);

        match batch.continuation_token.filter(|next| !next.is_empty()) {
            None => return Ok(records),
            Some(next) if !sent.insert(next.clone()) => {
                tracing::error!(operation, page, token = %next, "continuation token repeated");
                return Err(HyperproofError::PaginationStalled {
                    operation: operation.to_string(),
                });
            }
            Some(next) => token = Some(next),
        }
    }

    Err(HyperproofError::PageLimitExceeded {
        operation: operation.to_string(),
        max_pages,
    })
}
