//! Invalidation Policy
//!
//! What a node mutation does to the aggregate caches (node lists and graphs).

use serde::{Deserialize, Serialize};

use crate::queries::QueryKey;

use super::cache::CacheState;

/// How aggregate views are invalidated after `update_node`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationPolicy {
    /// Drop every cached node list and every graph, for every brain.
    #[default]
    ClearAll,
    /// Drop only the updated node's brain and the global graph. Falls back to
    /// `ClearAll` when the server response carries no `brain_id`.
    PerBrain,
}

/// Policy applied on node update unless configured otherwise.
pub const NODE_UPDATE_POLICY: InvalidationPolicy = InvalidationPolicy::ClearAll;

impl InvalidationPolicy {
    /// Invalidate aggregates after a node in `brain_id` changed and return the
    /// keys that went stale.
    pub(crate) fn apply_node_update(
        &self,
        cache: &mut CacheState,
        brain_id: Option<&str>,
    ) -> Vec<QueryKey> {
        match (self, brain_id.filter(|b| !b.is_empty())) {
            (InvalidationPolicy::PerBrain, Some(brain_id)) => {
                cache.invalidate_brain(brain_id);
                cache.global_graph = None;
                vec![QueryKey::Brain(brain_id.to_string()), QueryKey::GlobalGraph]
            }
            _ => {
                cache.clear_aggregates();
                vec![QueryKey::Brains, QueryKey::GlobalGraph]
            }
        }
    }
}
