//! Authentication Endpoints
//!
//! Credential exchange and session lifecycle. These calls go out without a
//! bearer token and bypass the 401 policy in `ApiClient::request`: a 401 from
//! `/api/login` means bad credentials, not an expired session.

use atlus_core::{ACCESS_TOKEN_KEY, LOGIN_ROUTE, REFRESH_TOKEN_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, RequestOptions};
use crate::error::{error_field, ApiError, ApiResult};
use crate::transport::RequestBody;

/// Tokens returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Outcome of `GET /api/health`. Never an error: failures are reported in
/// the fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiClient {
    /// Probe backend reachability.
    pub async fn health(&self) -> BackendHealth {
        let request = self.prepare("/api/health", RequestOptions::get(), None);
        match self.send(request).await {
            Ok((response, _)) if response.is_success() => BackendHealth {
                ok: true,
                status: None,
                error: None,
                data: None,
            },
            Ok((response, data)) => BackendHealth {
                ok: false,
                status: Some(response.status),
                error: None,
                data: Some(data),
            },
            Err(e) => BackendHealth {
                ok: false,
                status: None,
                error: Some(e.to_string()),
                data: None,
            },
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<Value> {
        self.public_post("/api/register", json!({"email": email, "password": password}))
            .await
    }

    /// Exchange email/password for tokens and store them.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginTokens> {
        let data = self
            .public_post("/api/login", json!({"email": email, "password": password}))
            .await?;
        self.store_tokens("/api/login", data)
    }

    /// Exchange a Google identity credential for tokens and store them.
    pub async fn google_login(&self, credential: &str) -> ApiResult<LoginTokens> {
        let data = self
            .public_post("/api/auth/google", json!({"credential": credential}))
            .await?;
        self.store_tokens("/api/auth/google", data)
    }

    /// Forget the session locally and return to the login route.
    pub fn logout(&self) -> ApiResult<()> {
        self.session().clear_tokens()?;
        self.navigator().replace(LOGIN_ROUTE);
        tracing::info!("Logged out");
        Ok(())
    }

    async fn public_post(&self, path: &str, body: Value) -> ApiResult<Value> {
        let request = self.prepare(path, RequestOptions::post(RequestBody::Json(body)), None);
        let (response, data) = self.send(request).await?;
        if !response.is_success() {
            let message = error_field(&data)
                .or_else(|| Some(response.status_text.clone()).filter(|s| !s.is_empty()))
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(ApiError::Http {
                status: response.status,
                message,
                body: data,
            });
        }
        Ok(data)
    }

    fn store_tokens(&self, path: &str, data: Value) -> ApiResult<LoginTokens> {
        let tokens: LoginTokens =
            serde_json::from_value(data).map_err(|e| ApiError::decode(path, e.to_string()))?;
        if tokens.access_token.is_empty() {
            return Err(ApiError::decode(path, "No token received"));
        }

        let session = self.session();
        session.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        match &tokens.refresh_token {
            Some(refresh) if !refresh.is_empty() => session.set(REFRESH_TOKEN_KEY, refresh)?,
            _ => session.remove(REFRESH_TOKEN_KEY)?,
        }
        tracing::info!("Logged in");
        Ok(tokens)
    }
}
