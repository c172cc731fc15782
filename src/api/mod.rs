mod client;
mod pagination;
mod request;
pub(crate) mod response;

pub use client::ApiClient;
pub use pagination::{collect_pages, PageBatch};
pub use request::{Body, Multipart, QueryParams, RequestSpec};
pub use response::ResponseEnvelope;
