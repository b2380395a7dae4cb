// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hippo memory graph.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Hippo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HippoConfig {
    /// Agent identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Hashed n-gram embedder parameters.
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Per-scope graph store bounds and thresholds.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Search blending across session and agent stores.
    #[serde(default)]
    pub search: SearchConfig,

    /// Asynchronous tag extraction pipeline.
    #[serde(default)]
    pub tagging: TaggingConfig,

    /// Session to agent promotion.
    #[serde(default)]
    pub promotion: PromotionConfig,

    /// Session checkpoint summaries.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Agent snapshot persistence.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Agent identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Identifier of the agent owning the long-term graph.
    #[serde(default = "default_agent_id")]
    pub id: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: default_agent_id(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_id() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Embedder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedderConfig {
    /// Number of hash buckets.
    #[serde(default = "default_dim")]
    pub dim: u32,

    /// Shortest character n-gram.
    #[serde(default = "default_min_n")]
    pub min_n: usize,

    /// Longest character n-gram.
    #[serde(default = "default_max_n")]
    pub max_n: usize,

    /// Seed folded into the n-gram hash.
    #[serde(default = "default_embedder_seed")]
    pub seed: u64,

    /// Seed prepended when deriving canonical keys.
    #[serde(default)]
    pub canonical_seed: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            dim: default_dim(),
            min_n: default_min_n(),
            max_n: default_max_n(),
            seed: default_embedder_seed(),
            canonical_seed: 0,
        }
    }
}

fn default_dim() -> u32 {
    16384
}

fn default_min_n() -> usize {
    3
}

fn default_max_n() -> usize {
    5
}

fn default_embedder_seed() -> u64 {
    0x9E37_79B9
}

/// Graph store configuration for both scopes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Short-lived, per-session stores.
    #[serde(default = "GraphStoreConfig::session")]
    pub session: GraphStoreConfig,

    /// The long-lived agent store.
    #[serde(default = "GraphStoreConfig::agent")]
    pub agent: GraphStoreConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            session: GraphStoreConfig::session(),
            agent: GraphStoreConfig::agent(),
        }
    }
}

/// Bounds and thresholds of one graph store. Immutable after the store is built.
///
/// Field defaults are the session-scope values. The agent scope gets its own
/// defaults through the layered loader.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphStoreConfig {
    /// Soft cap on live nodes.
    #[serde(default = "default_session_max_nodes")]
    pub max_nodes: usize,

    /// Soft cap on live edges.
    #[serde(default = "default_session_max_edges")]
    pub max_edges: usize,

    /// Minutes for the recency term to halve.
    #[serde(default = "default_session_half_life_min")]
    pub half_life_min: f64,

    /// Cosine threshold for treating two queries as the same node.
    #[serde(default = "default_tau_dup")]
    pub tau_dup: f64,

    /// Cosine threshold for linking two distinct queries.
    #[serde(default = "default_tau_sim")]
    pub tau_sim: f64,

    /// Nodes with at least this many edges are never evicted.
    #[serde(default = "default_session_protect_min_degree")]
    pub protect_min_degree: usize,

    /// Prune search candidates through the bucket index.
    #[serde(default = "default_true")]
    pub enable_inverted_index: bool,
}

impl GraphStoreConfig {
    /// Defaults for a session-scope store.
    pub fn session() -> Self {
        Self {
            max_nodes: default_session_max_nodes(),
            max_edges: default_session_max_edges(),
            half_life_min: default_session_half_life_min(),
            tau_dup: default_tau_dup(),
            tau_sim: default_tau_sim(),
            protect_min_degree: default_session_protect_min_degree(),
            enable_inverted_index: true,
        }
    }

    /// Defaults for the agent-scope store.
    pub fn agent() -> Self {
        Self {
            max_nodes: 2000,
            max_edges: 10000,
            half_life_min: 10080.0,
            tau_dup: default_tau_dup(),
            tau_sim: default_tau_sim(),
            protect_min_degree: 8,
            enable_inverted_index: true,
        }
    }
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self::session()
    }
}

fn default_session_max_nodes() -> usize {
    200
}

fn default_session_max_edges() -> usize {
    1000
}

fn default_session_half_life_min() -> f64 {
    30.0
}

fn default_tau_dup() -> f64 {
    0.96
}

fn default_tau_sim() -> f64 {
    0.35
}

fn default_session_protect_min_degree() -> usize {
    6
}

fn default_true() -> bool {
    true
}

/// Search blending configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Additive score bias applied to session hits.
    #[serde(default = "default_bias_session_first")]
    pub bias_session_first: f64,

    /// Result count used when the caller does not pass one.
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bias_session_first: default_bias_session_first(),
            default_k: default_k(),
        }
    }
}

fn default_bias_session_first() -> f64 {
    0.05
}

fn default_k() -> usize {
    8
}

/// Tag extraction pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaggingConfig {
    /// Buffer queries for tag extraction. When false, nothing is buffered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of queries per extraction batch.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Upper bound on tags per batch.
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: default_window(),
            max_tags: default_max_tags(),
        }
    }
}

fn default_window() -> usize {
    4
}

fn default_max_tags() -> usize {
    5
}

/// Promotion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionConfig {
    /// Maximum nodes moved per promotion call.
    #[serde(default = "default_max_promotions")]
    pub max_promotions: usize,

    /// Minimum rank for a query node to qualify.
    #[serde(default = "default_min_rank")]
    pub min_rank: f64,

    /// Minimum degree for a query node to qualify.
    #[serde(default = "default_min_degree")]
    pub min_degree: usize,

    /// Fold session weights into an existing agent node on merge.
    #[serde(default = "default_true")]
    pub carry_weights: bool,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            max_promotions: default_max_promotions(),
            min_rank: default_min_rank(),
            min_degree: default_min_degree(),
            carry_weights: true,
        }
    }
}

fn default_max_promotions() -> usize {
    10
}

fn default_min_rank() -> f64 {
    0.4
}

fn default_min_degree() -> usize {
    1
}

/// Checkpoint summary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointConfig {
    /// Root directory; files land in `<dir>/<agent id>/`.
    #[serde(default = "default_checkpoint_dir")]
    pub dir: String,

    /// Maximum queries written per checkpoint.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: default_checkpoint_dir(),
            top_k: default_top_k(),
        }
    }
}

fn default_checkpoint_dir() -> String {
    "checkpoints".to_string()
}

fn default_top_k() -> usize {
    20
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Where the agent snapshot is loaded from and saved to. Unset keeps the
    /// agent graph in memory only.
    #[serde(default)]
    pub agent_snapshot_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_defaults_differ() {
        let graph = GraphConfig::default();
        assert_eq!(graph.session.max_nodes, 200);
        assert_eq!(graph.session.protect_min_degree, 6);
        assert_eq!(graph.agent.max_nodes, 2000);
        assert_eq!(graph.agent.max_edges, 10000);
        assert_eq!(graph.agent.half_life_min, 10080.0);
        assert_eq!(graph.agent.protect_min_degree, 8);
    }

    #[test]
    fn embedder_seed_default() {
        let embedder = EmbedderConfig::default();
        assert_eq!(embedder.seed, 2_654_435_769);
        assert_eq!(embedder.canonical_seed, 0);
    }

    #[test]
    fn storage_path_unset_by_default() {
        assert!(StorageConfig::default().agent_snapshot_path.is_none());
    }
}
