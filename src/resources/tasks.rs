use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::to_body;
use crate::api::{ApiClient, Multipart, QueryParams, ResponseEnvelope};
use crate::error::Result;

/// Fields to change on a task. Anything left as `None` is left untouched.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    /// ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Criteria for `PUT /tasks/filter`. Empty criteria are omitted.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_object_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_object_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub task_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_after: Option<String>,
}

/// Where an uploaded piece of proof came from.
/// These travel as `hp-proof-*` form fields next to the file.
#[derive(Clone, Debug, Default)]
pub struct ProofProvenance {
    pub owned_by: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub source_file_id: Option<String>,
    pub source_modified_on: Option<String>,
    pub live_sync_enabled: bool,
}

impl ProofProvenance {
    fn attach(&self, form: Multipart) -> Multipart {
        form.text_opt("hp-proof-owned-by", self.owned_by.as_ref())
            .text_opt("hp-proof-source", self.source.as_ref())
            .text_opt("hp-proof-source-id", self.source_id.as_ref())
            .text_opt("hp-proof-source-file-id", self.source_file_id.as_ref())
            .text_opt("hp-proof-source-modified-on", self.source_modified_on.as_ref())
            .text("hp-proof-live-sync-enabled", self.live_sync_enabled)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub comment_text_formatted: String,
    pub is_internal_comment: bool,
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl TaskComment {
    /// A public comment on the task itself.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            comment_text_formatted: text.into(),
            is_internal_comment: false,
            object_type: "task".to_string(),
            object_id: None,
        }
    }
}

pub struct TasksApi {
    client: Arc<ApiClient>,
    base: String,
}

impl TasksApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let base = client.config().resource_base("tasks");
        Self { client, base }
    }

    pub async fn task(&self, task_id: &str, raw: bool) -> ResponseEnvelope {
        self.client
            .get(&self.base, &format!("/{task_id}"), QueryParams::new(), raw)
            .await
    }

    pub async fn update(&self, task_id: &str, update: &TaskUpdate, raw: bool) -> ResponseEnvelope {
        let Some(body) = to_body(update) else {
            return ResponseEnvelope::Absent;
        };
        self.client
            .patch(&self.base, &format!("/{task_id}"), Some(body), raw)
            .await
    }

    pub async fn filter(&self, filter: &TaskFilter, raw: bool) -> ResponseEnvelope {
        let Some(body) = to_body(filter) else {
            return ResponseEnvelope::Absent;
        };
        self.client.put(&self.base, "/filter", Some(body), raw).await
    }

    /// Uploads `file_path` as proof on the task.
    pub async fn add_proof(
        &self,
        task_id: &str,
        file_path: impl AsRef<Path>,
        provenance: &ProofProvenance,
        raw: bool,
    ) -> Result<ResponseEnvelope> {
        let files = Multipart::new().file_from_path("proof", file_path).await?;
        let files = provenance.attach(files);

        Ok(self
            .client
            .post(&self.base, &format!("/{task_id}/proof"), None, Some(files), raw)
            .await)
    }

    pub async fn proof_metadata(&self, task_id: &str, raw: bool) -> ResponseEnvelope {
        self.client
            .get(&self.base, &format!("/{task_id}/proof"), QueryParams::new(), raw)
            .await
    }

    pub async fn comments(&self, task_id: &str, raw: bool) -> ResponseEnvelope {
        self.client
            .get(&self.base, &format!("/{task_id}/comments"), QueryParams::new(), raw)
            .await
    }

    pub async fn add_comment(
        &self,
        task_id: &str,
        comment: &TaskComment,
        raw: bool,
    ) -> ResponseEnvelope {
        let Some(body) = to_body(comment) else {
            return ResponseEnvelope::Absent;
        };
        self.client
            .post(&self.base, &format!("/{task_id}/comments"), Some(body), None, raw)
            .await
    }

    pub async fn update_comment(
        &self,
        task_id: &str,
        comment_id: &str,
        comment: &TaskComment,
        raw: bool,
    ) -> ResponseEnvelope {
        let Some(body) = to_body(comment) else {
            return ResponseEnvelope::Absent;
        };
        self.client
            .patch(&self.base, &format!("/{task_id}/comments/{comment_id}"), Some(body), raw)
            .await
    }

    pub async fn delete_comment(
        &self,
        task_id: &str,
        comment_id: &str,
        raw: bool,
    ) -> ResponseEnvelope {
        self.client
            .delete(&self.base, &format!("/{task_id}/comments/{comment_id}"), raw)
            .await
    }
}
