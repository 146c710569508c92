//! Query Keys
//!
//! Hierarchical identifiers for cached server data. A key is a list of path
//! segments; invalidating a key removes every cached entry it prefixes, so
//! `Brain("b1")` covers both `BrainNodes("b1")` and `BrainGraph("b1")`.

use std::fmt;

use atlus_core::{BrainId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `brains` - every brain and everything under it
    Brains,
    /// `brains/{id}`
    Brain(BrainId),
    /// `brains/{id}/nodes`
    BrainNodes(BrainId),
    /// `brains/{id}/graph`
    BrainGraph(BrainId),
    /// `nodes` - every single-node entry
    Nodes,
    /// `nodes/{id}`
    Node(NodeId),
    /// `graph/global`
    GlobalGraph,
    /// `me/summary`
    MeSummary,
}

impl QueryKey {
    pub fn segments(&self) -> Vec<&str> {
        match self {
            QueryKey::Brains => vec!["brains"],
            QueryKey::Brain(id) => vec!["brains", id],
            QueryKey::BrainNodes(id) => vec!["brains", id, "nodes"],
            QueryKey::BrainGraph(id) => vec!["brains", id, "graph"],
            QueryKey::Nodes => vec!["nodes"],
            QueryKey::Node(id) => vec!["nodes", id],
            QueryKey::GlobalGraph => vec!["graph", "global"],
            QueryKey::MeSummary => vec!["me", "summary"],
        }
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &QueryKey) -> bool {
        let mine = self.segments();
        let theirs = other.segments();
        mine.len() <= theirs.len() && mine.iter().zip(theirs.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}
