//! Scripted transports shared by the integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atlus_api::{ApiClient, ApiRequest, ApiResponse, Transport, TransportError};
use atlus_client::{BrainStore, InvalidationPolicy};
use atlus_core::{ClientConfig, MemoryNavigator, SessionStore};
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::oneshot;

pub fn json_response(status: u16, body: &Value) -> ApiResponse {
    ApiResponse {
        status,
        status_text: match status {
            200 => "OK",
            401 => "Unauthorized",
            404 => "Not Found",
            _ => "",
        }
        .to_string(),
        body: Bytes::from(body.to_string()),
    }
}

/// Answers by `"METHOD url"`; unknown routes fail at the transport level.
#[derive(Default)]
pub struct RouteTransport {
    routes: Mutex<HashMap<String, (u16, Value)>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl RouteTransport {
    pub fn route(&self, method: &str, url: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, url), (status, body));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RouteTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = format!("{} {}", request.method, request.url);
        self.seen.lock().unwrap().push(request);
        let routes = self.routes.lock().unwrap();
        match routes.get(&key) {
            Some((status, body)) => Ok(json_response(*status, body)),
            None => Err(TransportError(format!("no route for {}", key))),
        }
    }
}

/// Holds every request until the test releases it, so tests decide the
/// order in which responses complete.
#[derive(Default)]
pub struct GatedTransport {
    pending: Mutex<Vec<Option<(String, oneshot::Sender<ApiResponse>)>>>,
}

impl GatedTransport {
    /// Number of requests received so far, released or not.
    pub fn received(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub async fn wait_for(&self, count: usize) {
        while self.received() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Complete the `index`-th request with `response`.
    pub fn release(&self, index: usize, response: ApiResponse) -> String {
        let (url, tx) = self.pending.lock().unwrap()[index]
            .take()
            .expect("request already released");
        let _ = tx.send(response);
        url
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .push(Some((request.url.clone(), tx)));
        rx.await
            .map_err(|_| TransportError("request abandoned".to_string()))
    }
}

pub fn api_client(
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<MemoryNavigator>,
) -> Arc<ApiClient> {
    Arc::new(ApiClient::with_transport(
        ClientConfig::default(),
        transport,
        session,
        navigator,
    ))
}

pub fn brain_store(
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<MemoryNavigator>,
    policy: InvalidationPolicy,
) -> BrainStore {
    BrainStore::with_policy(api_client(transport, session, navigator), policy)
}
