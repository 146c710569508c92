//! Brain Store
//!
//! Process-wide cache of brains, node lists, graphs and single nodes fetched
//! through the `ApiClient`. Owned by `AppState` and shared as `Arc<BrainStore>`.
//!
//! - slots go `absent -> present` on a successful fetch and back to absent on
//!   invalidation; a failed fetch leaves the cache untouched
//! - concurrent fetches for the same slot are not merged: each one writes when
//!   it completes, so the last to finish wins
//! - the lock is taken only after the network call returns and is never held
//!   across an `.await`
//!
//! Every write or invalidation is announced on the `subscribe()` channel.

mod cache;
mod events;
mod policy;

pub use events::{StoreEvent, EVENT_CAPACITY};
pub use policy::{InvalidationPolicy, NODE_UPDATE_POLICY};

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use atlus_api::{ApiClient, ApiError, ApiResult, UploadFiles};
use atlus_core::{
    Backlinks, Brain, BrainList, Graph, NewNode, Node, NodeLink, NodePatch, NodePage, NodeQuery,
    Related,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::queries::QueryKey;
use cache::CacheState;
use events::EventBus;

#[derive(Debug, Deserialize)]
struct CreatedBrain {
    brain: Brain,
}

pub struct BrainStore {
    api: Arc<ApiClient>,
    cache: RwLock<CacheState>,
    events: EventBus,
    policy: InvalidationPolicy,
}

impl BrainStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_policy(api, NODE_UPDATE_POLICY)
    }

    pub fn with_policy(api: Arc<ApiClient>, policy: InvalidationPolicy) -> Self {
        Self {
            api,
            cache: RwLock::new(CacheState::default()),
            events: EventBus::new(),
            policy,
        }
    }

    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Receive a `StoreEvent` for every subsequent cache change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ── Brains ─────────────────────────────────────────────────────────

    /// Load all brains the user owns and cache each one.
    pub async fn fetch_brains(&self) -> ApiResult<Vec<Brain>> {
        let list: BrainList = self.api.get_json("/api/brain/list").await?;
        {
            let mut cache = self.write();
            for brain in &list.brains {
                cache.brains.insert(brain.id.clone(), brain.clone());
            }
        }
        self.events.emit(StoreEvent::updated(&QueryKey::Brains));
        Ok(list.brains)
    }

    /// Load the brain list and cache the entry for `brain_id`, if present.
    pub async fn fetch_brain(&self, brain_id: &str) -> ApiResult<Option<Brain>> {
        let list: BrainList = self.api.get_json("/api/brain/list").await?;
        let brain = list.brains.into_iter().find(|b| b.id == brain_id);
        if let Some(brain) = &brain {
            self.write().brains.insert(brain.id.clone(), brain.clone());
            self.events
                .emit(StoreEvent::updated(&QueryKey::Brain(brain.id.clone())));
        }
        Ok(brain)
    }

    pub fn get_brain(&self, brain_id: &str) -> Option<Brain> {
        self.read().brains.get(brain_id).cloned()
    }

    /// Create a brain, optionally ingesting `files` at creation time.
    pub async fn create_brain(
        &self,
        name: &str,
        badge: Option<&str>,
        files: impl Into<UploadFiles>,
    ) -> ApiResult<Brain> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(name));
        if let Some(badge) = badge {
            fields.insert("badge".to_string(), Value::from(badge));
        }

        let data = self.api.upload("/api/brain/create", &fields, files).await?;
        let created: CreatedBrain = serde_json::from_value(data)
            .map_err(|e| ApiError::decode("/api/brain/create", e.to_string()))?;

        let brain = created.brain;
        self.write().brains.insert(brain.id.clone(), brain.clone());
        self.events
            .emit(StoreEvent::updated(&QueryKey::Brain(brain.id.clone())));
        tracing::info!(brain_id = %brain.id, "Brain created");
        Ok(brain)
    }

    /// Upload documents into an existing brain. The brain's list and graph,
    /// and the global graph, are invalidated once the server accepts them.
    pub async fn ingest_documents(
        &self,
        brain_id: &str,
        files: impl Into<UploadFiles>,
    ) -> ApiResult<Value> {
        let mut fields = Map::new();
        fields.insert("brain_id".to_string(), Value::from(brain_id));

        let result = self.api.upload("/api/brain/ingest", &fields, files).await?;
        self.invalidate_brain(brain_id);
        self.invalidate(&QueryKey::GlobalGraph);
        Ok(result)
    }

    // ── Node lists ─────────────────────────────────────────────────────

    /// Fetch one page of a brain's nodes. The page replaces whatever list is
    /// cached for `brain_id`, regardless of the query that produced it.
    pub async fn fetch_nodes(&self, brain_id: &str, query: &NodeQuery) -> ApiResult<NodePage> {
        let path = format!(
            "/api/brain/{}/nodes?{}",
            urlencoding::encode(brain_id),
            query.to_query_string()
        );
        let page: NodePage = self.api.get_json(&path).await?;
        self.write()
            .node_lists
            .insert(brain_id.to_string(), page.clone());
        self.events
            .emit(StoreEvent::updated(&QueryKey::BrainNodes(brain_id.to_string())));
        Ok(page)
    }

    pub fn get_nodes(&self, brain_id: &str) -> Option<NodePage> {
        self.read().node_lists.get(brain_id).cloned()
    }

    // ── Graphs ─────────────────────────────────────────────────────────

    pub async fn fetch_graph(&self, brain_id: &str) -> ApiResult<Graph> {
        let path = format!("/api/brain/{}/graph", urlencoding::encode(brain_id));
        let graph: Graph = self.api.get_json(&path).await?;
        self.write()
            .graphs
            .insert(brain_id.to_string(), graph.clone());
        self.events
            .emit(StoreEvent::updated(&QueryKey::BrainGraph(brain_id.to_string())));
        Ok(graph)
    }

    /// Cached graph for `brain_id`. Never touches the network.
    pub fn get_graph(&self, brain_id: &str) -> Option<Graph> {
        self.read().graphs.get(brain_id).cloned()
    }

    pub async fn fetch_global_graph(&self) -> ApiResult<Graph> {
        let graph: Graph = self.api.get_json("/api/graph/global").await?;
        self.write().global_graph = Some(graph.clone());
        self.events.emit(StoreEvent::updated(&QueryKey::GlobalGraph));
        Ok(graph)
    }

    pub fn get_global_graph(&self) -> Option<Graph> {
        self.read().global_graph.clone()
    }

    // ── Nodes ──────────────────────────────────────────────────────────

    pub async fn fetch_node(&self, node_id: &str) -> ApiResult<Node> {
        let path = format!("/api/nodes/{}", urlencoding::encode(node_id));
        let node: Node = self.api.get_json(&path).await?;
        self.write().nodes.insert(node_id.to_string(), node.clone());
        self.events
            .emit(StoreEvent::updated(&QueryKey::Node(node_id.to_string())));
        Ok(node)
    }

    pub fn get_node(&self, node_id: &str) -> Option<Node> {
        self.read().nodes.get(node_id).cloned()
    }

    /// Apply `patch` on the server and cache the node it returns.
    ///
    /// Any success status invalidates aggregate views according to the
    /// store's `InvalidationPolicy`. When the response body is not a node
    /// (empty or malformed), the cached copy of the node is dropped and
    /// `Ok(None)` is returned.
    pub async fn update_node(&self, node_id: &str, patch: &NodePatch) -> ApiResult<Option<Node>> {
        let path = format!("/api/nodes/{}", urlencoding::encode(node_id));
        let data: Value = self.api.put_json(&path, patch).await?;
        let node = match serde_json::from_value::<Node>(data) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!(node_id, error = %e, "Update response carried no node");
                None
            }
        };

        let brain_id = node.as_ref().map(|n| n.brain_id.as_str());
        let stale = {
            let mut cache = self.write();
            match &node {
                Some(node) => {
                    cache.nodes.insert(node_id.to_string(), node.clone());
                }
                None => {
                    cache.nodes.remove(node_id);
                }
            }
            self.policy.apply_node_update(&mut cache, brain_id)
        };
        tracing::debug!(node_id, policy = ?self.policy, "Node updated; aggregates invalidated");

        let node_key = QueryKey::Node(node_id.to_string());
        self.events.emit(match &node {
            Some(_) => StoreEvent::updated(&node_key),
            None => StoreEvent::invalidated(&node_key),
        });
        for key in &stale {
            self.events.emit(StoreEvent::invalidated(key));
        }
        Ok(node)
    }

    /// Create a node in `brain_id`. The returned node is cached; the brain's
    /// list and graph and the global graph are invalidated.
    pub async fn create_node(&self, brain_id: &str, new_node: &NewNode) -> ApiResult<Node> {
        let path = format!("/api/brain/{}/nodes", urlencoding::encode(brain_id));
        let node: Node = self.api.post_json(&path, new_node).await?;
        {
            let mut cache = self.write();
            cache.nodes.insert(node.id.clone(), node.clone());
            cache.invalidate_brain(brain_id);
            cache.global_graph = None;
        }
        self.events
            .emit(StoreEvent::updated(&QueryKey::Node(node.id.clone())));
        self.events
            .emit(StoreEvent::invalidated(&QueryKey::Brain(brain_id.to_string())));
        self.events
            .emit(StoreEvent::invalidated(&QueryKey::GlobalGraph));
        Ok(node)
    }

    /// Nodes that link to `node_id`. Not cached.
    pub async fn fetch_backlinks(&self, node_id: &str) -> ApiResult<Vec<NodeLink>> {
        let path = format!("/api/nodes/{}/backlinks", urlencoding::encode(node_id));
        let links: Backlinks = self.api.get_json(&path).await?;
        Ok(links.backlinks)
    }

    /// Graph and semantic neighbours of `node_id`. Not cached.
    pub async fn fetch_related(&self, node_id: &str) -> ApiResult<Vec<NodeLink>> {
        let path = format!("/api/nodes/{}/related", urlencoding::encode(node_id));
        let related: Related = self.api.get_json(&path).await?;
        Ok(related.related)
    }

    /// Dashboard summary for the current user. Not cached.
    pub async fn fetch_me_summary(&self) -> ApiResult<Value> {
        self.api.get_json("/api/me/summary").await
    }

    // ── Invalidation ───────────────────────────────────────────────────

    /// Drop `brain_id`'s node list and graph. Other brains, single nodes and
    /// the brain record itself are untouched.
    pub fn invalidate_brain(&self, brain_id: &str) {
        self.write().invalidate_brain(brain_id);
        self.events
            .emit(StoreEvent::invalidated(&QueryKey::Brain(brain_id.to_string())));
    }

    /// Drop every slot under `key`. Returns the number of slots removed.
    pub fn invalidate(&self, key: &QueryKey) -> usize {
        let removed = self.write().invalidate(key);
        tracing::debug!(key = %key, removed, "Cache invalidated");
        self.events.emit(StoreEvent::invalidated(key));
        removed
    }

    /// Drop everything. Used when the session ends.
    pub fn clear(&self) {
        self.write().clear();
        self.events.emit(StoreEvent::Cleared);
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}
