use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::api::{ApiClient, Multipart, QueryParams, ResponseEnvelope};
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// The object a piece of proof is attached to, e.g. (`control`, `<id>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRef {
    pub object_type: String,
    pub object_id: String,
}

impl ObjectRef {
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
        }
    }
}

/// Sorting, page size, and filtering for proof metadata listings.
#[derive(Clone, Debug)]
pub struct ProofListing {
    /// Records requested per page.
    pub limit: u32,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    pub object: Option<ObjectRef>,
}

impl Default for ProofListing {
    fn default() -> Self {
        Self {
            limit: 500,
            sort_by: "uploadedOn".to_string(),
            sort_direction: SortDirection::Desc,
            object: None,
        }
    }
}

impl ProofListing {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with("limit", self.limit)
            .with("sortBy", &self.sort_by)
            .with("sortDirection", self.sort_direction)
            .with_opt("objectType", self.object.as_ref().map(|o| &o.object_type))
            .with_opt("objectId", self.object.as_ref().map(|o| &o.object_id))
    }
}

/// Proof files and their metadata.
pub struct ProofApi {
    client: Arc<ApiClient>,
    base: String,
}

impl ProofApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let base = client.config().resource_base("proof");
        Self { client, base }
    }

    /// Every proof metadata record matching `listing`, across all pages.
    pub async fn metadata_collection(&self, listing: &ProofListing) -> Result<Vec<Value>> {
        self.client
            .get_all_pages(&self.base, "/", listing.to_query(), "proof metadata collection")
            .await
    }

    pub async fn metadata(&self, proof_id: &str, raw: bool) -> ResponseEnvelope {
        self.client
            .get(&self.base, &format!("/{proof_id}"), QueryParams::new(), raw)
            .await
    }

    /// The proof file itself; pass `raw` to get the body back untouched.
    pub async fn contents(
        &self,
        proof_id: &str,
        version: Option<&str>,
        raw: bool,
    ) -> ResponseEnvelope {
        let params = QueryParams::new().with_opt("version", version);
        self.client
            .get(&self.base, &format!("/{proof_id}/contents"), params, raw)
            .await
    }

    /// Uploads a new proof file, optionally linking it to `object`.
    pub async fn add_proof(
        &self,
        file_path: impl AsRef<Path>,
        object: Option<&ObjectRef>,
        raw: bool,
    ) -> Result<ResponseEnvelope> {
        let files = Multipart::new()
            .file_from_path("file", file_path)
            .await?
            .text_opt("objectId", object.map(|o| &o.object_id))
            .text_opt("objectType", object.map(|o| &o.object_type));

        Ok(self.client.post(&self.base, "/", None, Some(files), raw).await)
    }

    pub async fn add_proof_version(
        &self,
        proof_id: &str,
        file_path: impl AsRef<Path>,
        raw: bool,
    ) -> Result<ResponseEnvelope> {
        let files = Multipart::new().file_from_path("file", file_path).await?;

        Ok(self
            .client
            .post(&self.base, &format!("/{proof_id}/versions"), None, Some(files), raw)
            .await)
    }
}
