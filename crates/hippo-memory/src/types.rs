// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graph domain types: nodes, edges, snapshots, checkpoints and results.

use hippo_core::types::{CanonicalMeta, EmbedderState, SparseVector};
use serde::{Deserialize, Serialize};

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A user query.
    Query,
    /// Feedback attached to a query.
    Feedback,
    /// A topic tag.
    Entity,
    /// Reserved for assistant answers.
    Answer,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Query => "query",
            NodeKind::Feedback => "feedback",
            NodeKind::Entity => "entity",
            NodeKind::Answer => "answer",
        }
    }
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    SimilarTo,
    HasFeedback,
    RefersToEntity,
    /// Reserved for query to answer links.
    RespondedWith,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::SimilarTo => "similar_to",
            EdgeKind::HasFeedback => "has_feedback",
            EdgeKind::RefersToEntity => "refers_to_entity",
            EdgeKind::RespondedWith => "responded_with",
        }
    }
}

/// Eviction generation. Old nodes are evicted only after every eligible young one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    #[default]
    Young,
    Old,
}

impl Generation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Young => "young",
            Generation::Old => "old",
        }
    }
}

/// Unbounded ranking weights. Feedback can go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub repeat: f64,
    pub feedback: f64,
}

/// One memory unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
    pub embedding: Option<SparseVector>,
    pub created_at: i64,
    pub last_access: i64,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub degree: usize,
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub generation_updated_at: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

/// Directed, weighted relationship between two nodes of one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub weight: f64,
    pub created_at: i64,
    pub last_access: i64,
}

impl Edge {
    /// Deterministic id for a `(from, kind, to)` triple.
    pub fn key(from: &str, kind: EdgeKind, to: &str) -> String {
        format!("{from}|{}|{to}", kind.as_str())
    }
}

/// Options shared by tag upserts and node adoption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Generation to apply. `None` keeps the existing one (or young for new nodes).
    pub generation: Option<Generation>,
    /// Carry weights into an existing node on merge.
    pub carry_weights: bool,
}

/// Result of [`GraphStore::upsert_tag`](crate::store::GraphStore::upsert_tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpsert {
    pub id: String,
    pub created: bool,
}

/// Result of [`GraphStore::adopt_node`](crate::store::GraphStore::adopt_node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adoption {
    pub id: String,
    pub merged: bool,
}

/// One ranked search result from a single store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub sim: f64,
    pub score: f64,
    pub text: String,
    pub canonical_key: Option<String>,
}

/// Node and edge counters of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub queries: usize,
    pub feedback: usize,
    pub entities: usize,
    pub young: usize,
    pub old: usize,
    pub dirty: bool,
}

/// Node and edge tables of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Full graph dump, written by `save_to_file` and replayed by `from_snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub graph: GraphData,
    pub embedder: Option<EmbedderState>,
    pub canonical_meta: CanonicalMeta,
}

/// A query written into a checkpoint summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointQuery {
    pub id: String,
    pub text: String,
    pub last_access: i64,
    pub weights: Weights,
    pub degree: usize,
    pub canonical_key: Option<String>,
}

/// An edge touching one of the checkpointed queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub weight: f64,
}

/// Per-session summary written when a session is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub version: u32,
    pub agent_id: String,
    pub session_id: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub top_queries: Vec<CheckpointQuery>,
    pub edges: Vec<CheckpointEdge>,
    pub embedder: Option<EmbedderState>,
    pub canonical_meta: CanonicalMeta,
}
