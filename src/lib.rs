//! A client for the Hyperproof compliance API.
//!
//! [`ApiClient`] handles OAuth2 client-credentials authentication, attaches
//! bearer headers to every request, and normalizes responses into a
//! [`ResponseEnvelope`]. Listings that paginate with continuation tokens are
//! gathered with [`ApiClient::get_all_pages`]. [`Hyperproof`] bundles the
//! resource wrappers around one shared client.
//!
//! ```no_run
//! # async fn run() -> hyperproof::Result<()> {
//! use hyperproof::{ApiClient, Hyperproof, ProofListing};
//!
//! let hyperproof = Hyperproof::new(ApiClient::from_env().await?);
//! let proof = hyperproof
//!     .proof()
//!     .metadata_collection(&ProofListing::default())
//!     .await?;
//! println!("{} proof items", proof.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod oauth;
pub mod resources;

pub use api::{ApiClient, Multipart, PageBatch, QueryParams, RequestSpec, ResponseEnvelope};
pub use config::{ClientConfig, Credentials};
pub use error::{HyperproofError, Result};
pub use oauth::{AccessToken, TokenManager};
pub use resources::{
    Hyperproof, ObjectRef, ProofApi, ProofListing, ProofProvenance, SortDirection, TaskComment,
    TaskFilter, TaskUpdate, TasksApi, UsersApi,
};
