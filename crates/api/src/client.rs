//! API Client
//!
//! Single choke point for authenticated requests to the Atlus backend:
//!
//! - attaches `Authorization: Bearer <token>` from the session store
//! - defaults JSON content type (multipart bodies are left to the transport)
//! - parses JSON responses, substituting `{}` for unparsable success bodies
//! - on 401 clears the session and sends the user back to the login route
//!
//! The session token is only ever cleared here and in the explicit
//! login/logout operations in `auth`.

use std::sync::Arc;

use atlus_core::{ClientConfig, CoreResult, Navigator, SessionStore, LOGIN_ROUTE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{body_message, ApiError, ApiResult, DEFAULT_UNAUTHORIZED_MESSAGE};
use crate::http_client::build_http_client;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, RequestBody, Transport};
use crate::upload::{build_upload_form, UploadFiles};

/// Method, body and extra headers for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            body,
            ..Default::default()
        }
    }

    pub fn put(body: RequestBody) -> Self {
        Self {
            method: Method::PUT,
            body,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Authenticated client for the Atlus HTTP API.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> CoreResult<Self> {
        let http = build_http_client(&config)?;
        Ok(Self::with_transport(
            config,
            Arc::new(ReqwestTransport::new(http)),
            session,
            navigator,
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            navigator,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    pub(crate) fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Whether a session token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.session.access_token().is_some()
    }

    /// Issue an authenticated request and return the parsed JSON body.
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let token = self.session.access_token();
        let request = self.prepare(path, options, token.as_deref());
        let (response, data) = self.send(request).await?;

        if response.status == 401 {
            let message =
                body_message(&data).unwrap_or_else(|| DEFAULT_UNAUTHORIZED_MESSAGE.to_string());
            tracing::warn!(path, "Session rejected by server; clearing credentials");
            self.clear_session_and_redirect();
            return Err(ApiError::Unauthorized {
                message,
                body: data,
            });
        }

        if !response.is_success() {
            let message = body_message(&data).unwrap_or_else(|| response.status_text.clone());
            return Err(ApiError::Http {
                status: response.status,
                message,
                body: data,
            });
        }

        Ok(data)
    }

    /// POST a multipart form built from scalar `fields` and `files`.
    pub async fn upload(
        &self,
        path: &str,
        fields: &Map<String, Value>,
        files: impl Into<UploadFiles>,
    ) -> ApiResult<Value> {
        let form = build_upload_form(fields, files.into());
        self.request(path, RequestOptions::post(RequestBody::Multipart(form)))
            .await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let data = self.request(path, RequestOptions::get()).await?;
        decode(path, data)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = self
            .request(path, RequestOptions::post(json_body(body)?))
            .await?;
        decode(path, data)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = self
            .request(path, RequestOptions::put(json_body(body)?))
            .await?;
        decode(path, data)
    }

    /// Resolve URL and headers for a request.
    pub(crate) fn prepare(
        &self,
        path: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> ApiRequest {
        let mut request = ApiRequest {
            method: options.method,
            url: self.config.url_for(path),
            headers: options.headers,
            body: options.body,
        };
        if !request.body.is_multipart() && request.header("Content-Type").is_none() {
            request
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = token {
            request
                .headers
                .retain(|(k, _)| !k.eq_ignore_ascii_case("Authorization"));
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        request
    }

    /// Send a prepared request and parse its body, without any status policy.
    pub(crate) async fn send(&self, request: ApiRequest) -> ApiResult<(ApiResponse, Value)> {
        tracing::debug!(method = %request.method, url = %request.url, "API request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::debug!(error = %e, "Transport failure");
            ApiError::transport(e.0)
        })?;

        let data = parse_body(&response.body);
        tracing::debug!(status = response.status, "API response");
        Ok((response, data))
    }

    fn clear_session_and_redirect(&self) {
        if let Err(e) = self.session.clear_tokens() {
            tracing::warn!(error = %e, "Failed to clear session tokens");
        }
        if !self.navigator.is_at_login() {
            self.navigator.replace(LOGIN_ROUTE);
        }
    }
}

/// Parse a response body as JSON, falling back to an empty object.
pub fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::invalid_request(format!("Failed to serialize body: {}", e)))
}

fn decode<T: DeserializeOwned>(path: &str, data: Value) -> ApiResult<T> {
    serde_json::from_value(data).map_err(|e| ApiError::decode(path, e.to_string()))
}
