//! Cache slots
//!
//! Plain data behind the store's lock. Nothing in here performs I/O, so every
//! operation runs to completion while the lock is held.

use std::collections::HashMap;

use atlus_core::{Brain, BrainId, Graph, Node, NodeId, NodePage};

use crate::queries::QueryKey;

#[derive(Debug, Default, Clone)]
pub(crate) struct CacheState {
    pub(crate) brains: HashMap<BrainId, Brain>,
    /// One page per brain; the query that produced it is not part of the key.
    pub(crate) node_lists: HashMap<BrainId, NodePage>,
    pub(crate) graphs: HashMap<BrainId, Graph>,
    pub(crate) global_graph: Option<Graph>,
    pub(crate) nodes: HashMap<NodeId, Node>,
}

impl CacheState {
    /// Drop `brain_id`'s node list and graph. The brain record stays.
    pub(crate) fn invalidate_brain(&mut self, brain_id: &str) {
        self.node_lists.remove(brain_id);
        self.graphs.remove(brain_id);
    }

    /// Drop every node list and every graph.
    pub(crate) fn clear_aggregates(&mut self) {
        self.node_lists.clear();
        self.graphs.clear();
        self.global_graph = None;
    }

    /// Remove every slot whose key starts with `prefix`. Returns how many
    /// slots were removed.
    pub(crate) fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let before = self.len();

        self.brains
            .retain(|id, _| !prefix.is_prefix_of(&QueryKey::Brain(id.clone())));
        self.node_lists
            .retain(|id, _| !prefix.is_prefix_of(&QueryKey::BrainNodes(id.clone())));
        self.graphs
            .retain(|id, _| !prefix.is_prefix_of(&QueryKey::BrainGraph(id.clone())));
        self.nodes
            .retain(|id, _| !prefix.is_prefix_of(&QueryKey::Node(id.clone())));
        if prefix.is_prefix_of(&QueryKey::GlobalGraph) {
            self.global_graph = None;
        }

        before - self.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.brains.len()
            + self.node_lists.len()
            + self.graphs.len()
            + self.nodes.len()
            + usize::from(self.global_graph.is_some())
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
