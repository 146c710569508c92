//! Brain Store Integration Tests
//!
//! Cache behaviour seen through the public `BrainStore` API:
//! - reads on never-fetched keys
//! - node update caching and aggregate invalidation
//! - per-brain invalidation
//! - completion-order writes for racing fetches

use std::sync::Arc;

use atlus_client::{BrainStore, InvalidationPolicy, QueryKey, StoreEvent};
use atlus_core::{MemoryNavigator, MemorySessionStore, NodePatch, NodeQuery};
use serde_json::json;

use crate::support::{brain_store, json_response, GatedTransport, RouteTransport};

// ============================================================================
// Helpers
// ============================================================================

fn routed(policy: InvalidationPolicy) -> (BrainStore, Arc<RouteTransport>) {
    let transport = Arc::new(RouteTransport::default());
    let store = brain_store(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
        policy,
    );
    (store, transport)
}

fn graph(brain_id: &str, node_id: &str) -> serde_json::Value {
    json!({
        "nodes": [{"id": node_id, "brain_id": brain_id, "title": node_id}],
        "edges": [{"source": node_id, "target": node_id, "type": "related", "weight": null}]
    })
}

fn page(brain_id: &str) -> serde_json::Value {
    json!({"nodes": [{"id": "n1", "brain_id": brain_id}], "total": 1, "page": 1, "per_page": 50})
}

fn route_two_brains(transport: &RouteTransport) {
    for b in ["b1", "b2"] {
        transport.route("GET", &format!("/api/brain/{}/graph", b), 200, graph(b, "n1"));
        transport.route(
            "GET",
            &format!("/api/brain/{}/nodes?page=1&per_page=50&sort=recent", b),
            200,
            page(b),
        );
    }
    transport.route("GET", "/api/graph/global", 200, graph("b1", "n1"));
}

async fn warm(store: &BrainStore) {
    for b in ["b1", "b2"] {
        store.fetch_graph(b).await.unwrap();
        store.fetch_nodes(b, &NodeQuery::default()).await.unwrap();
    }
    store.fetch_global_graph().await.unwrap();
}

// ============================================================================
// Reads without fetches
// ============================================================================

#[test]
fn test_unfetched_keys_read_as_absent_without_network() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);

    assert!(store.get_graph("b1").is_none());
    assert!(store.get_nodes("b1").is_none());
    assert!(store.get_node("n1").is_none());
    assert!(store.get_brain("b1").is_none());
    assert!(store.get_global_graph().is_none());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_then_read_back() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);

    let fetched = store.fetch_graph("b1").await.unwrap();
    assert_eq!(store.get_graph("b1"), Some(fetched.clone()));
    assert_eq!(fetched.edges[0].weight, None);
    assert!(store.get_graph("b2").is_none());

    // refetch replaces the slot
    transport.route("GET", "/api/brain/b1/graph", 200, graph("b1", "n5"));
    store.fetch_graph("b1").await.unwrap();
    assert_eq!(store.get_graph("b1").unwrap().nodes[0].id, "n5");
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_value() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    store.fetch_graph("b1").await.unwrap();

    transport.route("GET", "/api/brain/b1/graph", 500, json!({"error": "db down"}));
    let err = store.fetch_graph("b1").await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(store.get_graph("b1").unwrap().nodes[0].id, "n1");
}

// ============================================================================
// update_node
// ============================================================================

#[tokio::test]
async fn test_update_node_caches_server_response_not_patch() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    transport.route(
        "PUT",
        "/api/nodes/n1",
        200,
        json!({
            "id": "n1",
            "brain_id": "b1",
            "title": "Entropy",
            "tags": ["physics"],
            "updated_at": "2025-03-01T10:00:00+00:00"
        }),
    );

    let patch = NodePatch {
        title: Some("   Entropy   ".to_string()),
        tags: Some(vec!["physics".to_string(), "".to_string()]),
        ..Default::default()
    };
    store.update_node("n1", &patch).await.unwrap();

    let cached = store.get_node("n1").unwrap();
    assert_eq!(cached.title, "Entropy");
    assert_eq!(cached.tags, vec!["physics".to_string()]);
    assert_eq!(cached.updated_at.as_deref(), Some("2025-03-01T10:00:00+00:00"));
}

#[tokio::test]
async fn test_update_node_clears_every_brains_aggregates() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    transport.route("PUT", "/api/nodes/n1", 200, json!({"id": "n1", "brain_id": "b1"}));
    warm(&store).await;

    store.update_node("n1", &NodePatch::default()).await.unwrap();

    for b in ["b1", "b2"] {
        assert!(store.get_graph(b).is_none(), "graph for {} survived", b);
        assert!(store.get_nodes(b).is_none(), "node list for {} survived", b);
    }
    assert!(store.get_global_graph().is_none());
}

#[tokio::test]
async fn test_update_node_with_empty_body_still_clears_aggregates() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    transport.route("GET", "/api/nodes/n1", 200, json!({"id": "n1", "brain_id": "b1"}));
    transport.route("PUT", "/api/nodes/n1", 200, json!({}));
    warm(&store).await;
    store.fetch_node("n1").await.unwrap();
    let mut rx = store.subscribe();

    let updated = store.update_node("n1", &NodePatch::default()).await.unwrap();

    assert!(updated.is_none());
    assert!(store.get_node("n1").is_none());
    for b in ["b1", "b2"] {
        assert!(store.get_graph(b).is_none());
        assert!(store.get_nodes(b).is_none());
    }
    assert!(store.get_global_graph().is_none());
    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Invalidated("nodes/n1".into()));
    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Invalidated("brains".into()));
}

#[tokio::test]
async fn test_update_node_per_brain_policy_keeps_other_brains() {
    let (store, transport) = routed(InvalidationPolicy::PerBrain);
    route_two_brains(&transport);
    transport.route("PUT", "/api/nodes/n1", 200, json!({"id": "n1", "brain_id": "b1"}));
    warm(&store).await;

    store.update_node("n1", &NodePatch::default()).await.unwrap();

    assert!(store.get_graph("b1").is_none());
    assert!(store.get_nodes("b1").is_none());
    assert!(store.get_graph("b2").is_some());
    assert!(store.get_nodes("b2").is_some());
    assert!(store.get_global_graph().is_none());
}

// ============================================================================
// invalidate_brain / invalidate
// ============================================================================

#[tokio::test]
async fn test_invalidate_brain_touches_only_that_brain() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    transport.route("GET", "/api/nodes/n1", 200, json!({"id": "n1", "brain_id": "b1"}));
    warm(&store).await;
    store.fetch_node("n1").await.unwrap();

    store.invalidate_brain("b1");

    assert!(store.get_graph("b1").is_none());
    assert!(store.get_nodes("b1").is_none());
    assert!(store.get_graph("b2").is_some());
    assert!(store.get_nodes("b2").is_some());
    assert!(store.get_global_graph().is_some());
    assert!(store.get_node("n1").is_some());
}

#[tokio::test]
async fn test_invalidate_everything_under_brains() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    warm(&store).await;

    let removed = store.invalidate(&QueryKey::Brains);

    assert_eq!(removed, 4);
    assert!(store.get_global_graph().is_some());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_subscribers_see_writes_and_invalidations() {
    let (store, transport) = routed(InvalidationPolicy::ClearAll);
    route_two_brains(&transport);
    transport.route("PUT", "/api/nodes/n1", 200, json!({"id": "n1", "brain_id": "b1"}));
    let mut rx = store.subscribe();

    store.fetch_graph("b2").await.unwrap();
    store.update_node("n1", &NodePatch::default()).await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Updated("brains/b2/graph".into()));
    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Updated("nodes/n1".into()));
    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Invalidated("brains".into()));
    assert_eq!(rx.recv().await.unwrap(), StoreEvent::Invalidated("graph/global".into()));
}

// ============================================================================
// Races
// ============================================================================

#[tokio::test]
async fn test_racing_graph_fetches_last_completion_wins() {
    let transport = Arc::new(GatedTransport::default());
    let store = Arc::new(brain_store(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
        InvalidationPolicy::ClearAll,
    ));

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_graph("b1").await }
    });
    transport.wait_for(1).await;

    let second = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_graph("b1").await }
    });
    transport.wait_for(2).await;

    // The request issued second completes first.
    transport.release(1, json_response(200, &graph("b1", "from-second")));
    second.await.unwrap().unwrap();
    assert_eq!(store.get_graph("b1").unwrap().nodes[0].id, "from-second");

    transport.release(0, json_response(200, &graph("b1", "from-first")));
    first.await.unwrap().unwrap();
    assert_eq!(store.get_graph("b1").unwrap().nodes[0].id, "from-first");
}

#[tokio::test]
async fn test_racing_node_list_queries_share_one_slot() {
    let transport = Arc::new(GatedTransport::default());
    let store = Arc::new(brain_store(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
        InvalidationPolicy::ClearAll,
    ));

    let page_two = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_nodes("b1", &NodeQuery::default().page(2)).await }
    });
    transport.wait_for(1).await;
    let search = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_nodes("b1", &NodeQuery::default().search("heat")).await }
    });
    transport.wait_for(2).await;

    let url = transport.release(
        0,
        json_response(200, &json!({"nodes": [], "total": 80, "page": 2, "per_page": 50})),
    );
    assert!(url.contains("page=2"));
    page_two.await.unwrap().unwrap();

    let url = transport.release(
        1,
        json_response(200, &json!({"nodes": [{"id": "n4"}], "total": 1, "page": 1, "per_page": 50})),
    );
    assert!(url.contains("q=heat"));
    search.await.unwrap().unwrap();

    let cached = store.get_nodes("b1").unwrap();
    assert_eq!(cached.total, 1);
    assert_eq!(cached.nodes[0].id, "n4");
}
