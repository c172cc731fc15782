//! Thin wrappers mapping named parameters onto fixed REST endpoints.
//!
//! Each wrapper holds a handle to one shared [`ApiClient`]; none of them
//! keep any state of their own.

mod proof;
mod tasks;
mod users;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiClient;

pub use proof::{ObjectRef, ProofApi, ProofListing, SortDirection};
pub use tasks::{ProofProvenance, TaskComment, TaskFilter, TaskUpdate, TasksApi};
pub use users::UsersApi;

/// One client, with every resource wrapper built around it up front.
pub struct Hyperproof {
    client: Arc<ApiClient>,
    proof: ProofApi,
    tasks: TasksApi,
    users: UsersApi,
}

impl Hyperproof {
    pub fn new(client: ApiClient) -> Self {
        Self::from_shared(Arc::new(client))
    }

    pub fn from_shared(client: Arc<ApiClient>) -> Self {
        Self {
            proof: ProofApi::new(client.clone()),
            tasks: TasksApi::new(client.clone()),
            users: UsersApi::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn proof(&self) -> &ProofApi {
        &self.proof
    }

    pub fn tasks(&self) -> &TasksApi {
        &self.tasks
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }
}

/// Serializes a request body, logging instead of failing.
pub(crate) fn to_body(value: &impl Serialize) -> Option<Value> {
    serde_json::to_value(value)
        .map_err(|err| tracing::error!(error = %err, "unable to serialize request body"))
        .ok()
}
