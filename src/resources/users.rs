use std::sync::Arc;

use crate::api::{ApiClient, QueryParams, ResponseEnvelope};

pub struct UsersApi {
    client: Arc<ApiClient>,
    base: String,
}

impl UsersApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let base = client.config().resource_base("users");
        Self { client, base }
    }

    /// The user the API client is acting as.
    /// `expand` accepts e.g. `identityProviders,organizations`.
    pub async fn current_user(&self, expand: Option<&str>, raw: bool) -> ResponseEnvelope {
        let params = QueryParams::new().with_opt("expand", expand);
        self.client.get(&self.base, "/me", params, raw).await
    }

    pub async fn organization_users(
        &self,
        expand: Option<&str>,
        include_deactivated: bool,
        raw: bool,
    ) -> ResponseEnvelope {
        let params = QueryParams::new()
            .with_opt("expand", expand)
            .with("includeDeactivated", include_deactivated);
        self.client.get(&self.base, "/", params, raw).await
    }
}
