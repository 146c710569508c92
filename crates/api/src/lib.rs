//! Atlus API
//!
//! Authenticated HTTP access to the Atlus backend:
//! - `client` - `ApiClient::request` / `upload` with the session policy
//! - `auth` - login, registration, logout and health probes
//! - `transport` - the `Transport` seam and its reqwest implementation
//! - `upload` - multipart form model
//! - `http_client` - reqwest client factory

pub mod auth;
pub mod client;
pub mod error;
pub mod http_client;
pub mod transport;
pub mod upload;

pub use auth::{BackendHealth, LoginTokens};
pub use client::{parse_body, ApiClient, RequestOptions};
pub use error::{ApiError, ApiResult};
pub use http_client::build_http_client;
pub use reqwest::Method;
pub use transport::{
    ApiRequest, ApiResponse, ReqwestTransport, RequestBody, Transport, TransportError,
};
pub use upload::{
    build_upload_form, FormPart, MultipartForm, UploadFile, UploadFiles, FILES_FIELD, FILE_FIELD,
};
