//! Domain Models
//!
//! Wire types for brains, nodes and graphs as returned by the Atlus backend.
//! Every response type tolerates missing fields so a partial or empty JSON
//! object (the client substitutes `{}` for unparsable bodies) still decodes.

use serde::{Deserialize, Serialize};

/// Server-assigned brain identifier.
pub type BrainId = String;

/// Server-assigned node identifier.
pub type NodeId = String;

/// A named collection of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    pub id: BrainId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A single note/document belonging to exactly one brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markdown_content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub brain_id: BrainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_node_ids: Vec<NodeId>,
}

fn default_node_type() -> String {
    "note".to_string()
}

fn default_edge_type() -> String {
    "related".to_string()
}

/// Directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Nodes and edges for one brain, or across all brains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Edges whose endpoints are both present in `nodes`.
    pub fn resolved_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| {
            self.nodes.iter().any(|n| n.id == e.source)
                && self.nodes.iter().any(|n| n.id == e.target)
        })
    }
}

/// One page of a brain's node list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePage {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

/// Node list ordering accepted by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Recent,
    Alpha,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Alpha => "alpha",
        }
    }
}

/// Pagination and filter parameters for a node-list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeQuery {
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

impl Default for NodeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
            q: String::new(),
            tag: String::new(),
            sort: Some(SortOrder::Recent),
        }
    }
}

impl NodeQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = q.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Encode as a URL query string (no leading `?`).
    ///
    /// `page` and `per_page` are always present; `q`, `tag` and `sort` only
    /// when set.
    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        ser.append_pair("page", &self.page.to_string());
        ser.append_pair("per_page", &self.per_page.to_string());
        if !self.q.is_empty() {
            ser.append_pair("q", &self.q);
        }
        if !self.tag.is_empty() {
            ser.append_pair("tag", &self.tag);
        }
        if let Some(sort) = self.sort {
            ser.append_pair("sort", sort.as_str());
        }
        ser.finish()
    }
}

/// Partial update for `PUT /api/nodes/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body for `POST /api/brain/{id}/nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    pub title: String,
    pub markdown_content: String,
    pub tags: Vec<String>,
    pub node_type: String,
}

impl Default for NewNode {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            markdown_content: String::new(),
            tags: Vec::new(),
            node_type: default_node_type(),
        }
    }
}

/// Lightweight node reference used by the backlinks and related sidebars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// `"semantic"` for embedding-similarity neighbours, absent for graph edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrainList {
    #[serde(default)]
    pub brains: Vec<Brain>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Backlinks {
    #[serde(default)]
    pub backlinks: Vec<NodeLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Related {
    #[serde(default)]
    pub related: Vec<NodeLink>,
}
