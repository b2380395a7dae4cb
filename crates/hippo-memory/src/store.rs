// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, self-organizing graph of queries, feedback and tags.
//!
//! Nodes and edges live in id-keyed tables. Three indices sit beside them:
//! canonical key to node id, node id to incident edge ids, and embedding
//! bucket to query node ids. Every public mutation finishes with an eviction
//! pass so the configured bounds hold again before it returns.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use hippo_config::model::GraphStoreConfig;
use hippo_core::error::HippoError;
use hippo_core::traits::EmbeddingProvider;
use hippo_core::types::{CanonicalMeta, FeedbackLabel, SparseVector, cosine_similarity};
use tracing::{debug, info};
use uuid::Uuid;

use crate::canonical::{CANONICAL_HASH_ALGO, Canonicalizer};
use crate::embedder::NORM_VERSION;
use crate::rank::rank;
use crate::snapshot;
use crate::types::{
    Adoption, Edge, EdgeKind, Generation, GraphData, GraphSnapshot, GraphStats, MergeOptions,
    Node, NodeKind, SearchHit, TagUpsert, Weights,
};

/// Most `similar_to` edges created for one new query.
const MAX_SIMILAR_LINKS: usize = 10;

/// Feedback boost applied to both endpoints of a new `similar_to` edge.
const TOUCH_BOOST: f64 = 0.3;

/// Repeat bump for a re-upserted tag, with and without weight carrying.
const TAG_REPEAT_CARRY: f64 = 0.2;
const TAG_REPEAT_PLAIN: f64 = 0.05;

/// Share of the incoming repeat weight folded into feedback on adoption merges.
const ADOPT_REPEAT_SHARE: f64 = 0.2;

const SEARCH_SIM_WEIGHT: f64 = 0.7;
const SEARCH_RANK_WEIGHT: f64 = 0.3;

/// Millisecond clock that never moves backwards.
#[derive(Debug, Default)]
struct MonotonicClock {
    last: i64,
}

impl MonotonicClock {
    fn tick(&mut self) -> i64 {
        self.last = self.last.max(chrono::Utc::now().timestamp_millis());
        self.last
    }

    fn peek(&self) -> i64 {
        self.last.max(chrono::Utc::now().timestamp_millis())
    }

    fn observe(&mut self, ts: i64) {
        self.last = self.last.max(ts);
    }
}

/// One bounded memory graph.
pub struct GraphStore {
    config: GraphStoreConfig,
    embedder: Box<dyn EmbeddingProvider>,
    canonicalizer: Canonicalizer,
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Edge>,
    by_canonical: HashMap<String, String>,
    incident: HashMap<String, HashSet<String>>,
    by_bucket: HashMap<u32, HashSet<String>>,
    clock: MonotonicClock,
    dirty: bool,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl GraphStore {
    /// Creates an empty store. The configuration is fixed for the store's lifetime.
    pub fn new(config: GraphStoreConfig, embedder: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            embedder,
            canonicalizer: Canonicalizer::default(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            by_canonical: HashMap::new(),
            incident: HashMap::new(),
            by_bucket: HashMap::new(),
            clock: MonotonicClock::default(),
            dirty: false,
        }
    }

    /// Uses `seed` for canonical keys instead of 0.
    pub fn with_canonical_seed(mut self, seed: u64) -> Self {
        self.canonicalizer = Canonicalizer::new(seed);
        self
    }

    pub fn config(&self) -> &GraphStoreConfig {
        &self.config
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn canonical_meta(&self) -> CanonicalMeta {
        self.canonicalizer.meta()
    }

    // --- queries -------------------------------------------------------------

    /// Inserts a query, or merges it into an exact or near duplicate.
    ///
    /// Returns the id of the new or merged node.
    pub fn upsert_query(&mut self, text: &str) -> Result<String, HippoError> {
        let now = self.clock.tick();
        let key = self.canonicalizer.query_key(text);

        if let Some(id) = self.by_canonical.get(&key).cloned() {
            self.merge_repeat(&id, now);
            self.evict();
            return Ok(id);
        }

        let embedding = self.embedder.embed(text);
        let similar = self.similar_queries(&embedding);

        if let Some((best, sim)) = similar.first()
            && *sim >= self.config.tau_dup
        {
            let id = best.clone();
            debug!(node_id = %id, sim, "near-duplicate query merged");
            self.merge_repeat(&id, now);
            self.evict();
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        let node = Node {
            id: id.clone(),
            kind: NodeKind::Query,
            text: text.to_string(),
            canonical_key: Some(key),
            embedding: Some(embedding),
            created_at: now,
            last_access: now,
            weights: Weights::default(),
            degree: 0,
            generation: Generation::Young,
            generation_updated_at: now,
            pinned: false,
        };
        self.insert_node(node);

        let tau_sim = self.config.tau_sim;
        for (other, sim) in similar
            .into_iter()
            .filter(|(_, sim)| *sim >= tau_sim)
            .take(MAX_SIMILAR_LINKS)
        {
            self.put_edge(&id, &other, EdgeKind::SimilarTo, sim, now);
            for endpoint in [&id, &other] {
                if let Some(node) = self.nodes.get_mut(endpoint) {
                    node.weights.feedback += TOUCH_BOOST;
                }
            }
        }

        self.dirty = true;
        self.evict();
        Ok(id)
    }

    /// Query nodes sorted by descending similarity to `embedding` (ties by id).
    ///
    /// With the inverted index enabled only queries sharing a bucket are
    /// scored; the rest have similarity 0 and could never pass `tau_sim`.
    fn similar_queries(&self, embedding: &SparseVector) -> Vec<(String, f64)> {
        let mut scored: Vec<(String, f64)> = self
            .query_candidates(embedding)
            .into_iter()
            .filter_map(|id| {
                let node = self.nodes.get(id)?;
                let other = node.embedding.as_ref()?;
                (node.kind == NodeKind::Query)
                    .then(|| (id.to_string(), cosine_similarity(embedding, other)))
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored
    }

    fn query_candidates<'a>(&'a self, embedding: &SparseVector) -> Vec<&'a str> {
        if !self.config.enable_inverted_index {
            return self.nodes.keys().map(String::as_str).collect();
        }
        let mut seen: HashSet<&'a str> = HashSet::new();
        for bucket in embedding.buckets() {
            if let Some(ids) = self.by_bucket.get(&bucket) {
                seen.extend(ids.iter().map(String::as_str));
            }
        }
        seen.into_iter().collect()
    }

    fn merge_repeat(&mut self, id: &str, now: i64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.weights.repeat += 1.0;
            node.last_access = now;
        }
        self.touch_incident_edges(id, now);
        self.dirty = true;
    }

    fn touch_incident_edges(&mut self, id: &str, now: i64) {
        if let Some(edge_ids) = self.incident.get(id) {
            for edge_id in edge_ids {
                if let Some(edge) = self.edges.get_mut(edge_id) {
                    edge.last_access = now;
                }
            }
        }
    }

    // --- tags and feedback ---------------------------------------------------

    /// Inserts an entity tag or merges it with an existing tag of the same key.
    pub fn upsert_tag(
        &mut self,
        tag: &str,
        opts: MergeOptions,
    ) -> Result<TagUpsert, HippoError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(HippoError::Validation("tag text must not be blank".into()));
        }
        let now = self.clock.tick();
        let key = self.canonicalizer.tag_key(tag);

        if let Some(id) = self.by_canonical.get(&key).cloned() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.weights.repeat += if opts.carry_weights {
                    TAG_REPEAT_CARRY
                } else {
                    TAG_REPEAT_PLAIN
                };
                node.last_access = now;
                if let Some(generation) = opts.generation {
                    node.generation = generation;
                    node.generation_updated_at = now;
                }
            }
            self.dirty = true;
            self.evict();
            return Ok(TagUpsert { id, created: false });
        }

        let id = Uuid::new_v4().to_string();
        let node = Node {
            id: id.clone(),
            kind: NodeKind::Entity,
            text: tag.to_string(),
            canonical_key: Some(key),
            embedding: Some(self.embedder.embed(tag)),
            created_at: now,
            last_access: now,
            weights: Weights::default(),
            degree: 0,
            generation: opts.generation.unwrap_or_default(),
            generation_updated_at: now,
            pinned: false,
        };
        self.insert_node(node);
        self.dirty = true;
        self.evict();
        Ok(TagUpsert { id, created: true })
    }

    /// Attaches feedback to a query node and nudges its feedback weight.
    ///
    /// Fails with [`HippoError::NodeNotFound`] unless `query_id` is a live query.
    pub fn record_feedback(
        &mut self,
        query_id: &str,
        label: FeedbackLabel,
        note: Option<&str>,
    ) -> Result<String, HippoError> {
        match self.nodes.get(query_id) {
            Some(node) if node.kind == NodeKind::Query => {}
            _ => {
                return Err(HippoError::NodeNotFound {
                    id: query_id.to_string(),
                });
            }
        }

        let now = self.clock.tick();
        let text = match note {
            Some(note) => format!("{label}: {note}"),
            None => label.to_string(),
        };
        let id = Uuid::new_v4().to_string();
        self.insert_node(Node {
            id: id.clone(),
            kind: NodeKind::Feedback,
            text,
            canonical_key: None,
            embedding: None,
            created_at: now,
            last_access: now,
            weights: Weights::default(),
            degree: 0,
            generation: Generation::Young,
            generation_updated_at: now,
            pinned: false,
        });
        self.put_edge(query_id, &id, EdgeKind::HasFeedback, 1.0, now);

        if let Some(query) = self.nodes.get_mut(query_id) {
            query.weights.feedback += label.nudge();
            query.last_access = now;
        }

        self.dirty = true;
        self.evict();
        Ok(id)
    }

    /// Links a query to a tag with a `refers_to_entity` edge.
    ///
    /// Returns `false` without touching the store unless `tag_id` is an entity
    /// and `query_id` is a query.
    pub fn link_tag_to_query(&mut self, tag_id: &str, query_id: &str, weight: f64) -> bool {
        let is_kind =
            |id: &str, kind: NodeKind| self.nodes.get(id).is_some_and(|n| n.kind == kind);
        if !is_kind(tag_id, NodeKind::Entity) || !is_kind(query_id, NodeKind::Query) {
            return false;
        }
        let now = self.clock.tick();
        self.put_edge(query_id, tag_id, EdgeKind::RefersToEntity, weight, now);
        self.dirty = true;
        self.evict();
        true
    }

    // --- search --------------------------------------------------------------

    /// Ranks query nodes by `0.7 * cosine + 0.3 * rank`. Read-only.
    pub fn search_similar_queries(&self, text: &str, k: usize) -> Vec<SearchHit> {
        let embedding = self.embedder.embed(text);
        let now = self.clock.peek();
        let half_life = self.config.half_life_min;

        let mut hits: Vec<SearchHit> = self
            .query_candidates(&embedding)
            .into_iter()
            .filter_map(|id| {
                let node = self.nodes.get(id)?;
                if node.kind != NodeKind::Query {
                    return None;
                }
                let sim = cosine_similarity(&embedding, node.embedding.as_ref()?);
                Some(SearchHit {
                    id: node.id.clone(),
                    sim,
                    score: SEARCH_SIM_WEIGHT * sim + SEARCH_RANK_WEIGHT * rank(node, now, half_life),
                    text: node.text.clone(),
                    canonical_key: node.canonical_key.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        hits
    }

    // --- generation and ownership transfer -----------------------------------

    /// Sets a node's generation. Returns `false` if the node is not in the store.
    pub fn promote_generation(&mut self, id: &str, target: Generation) -> bool {
        let now = self.clock.tick();
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.generation = target;
                node.generation_updated_at = now;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Removes a node with its incident edges and index entries.
    ///
    /// The returned node has `degree == 0`.
    pub fn detach_node(&mut self, id: &str) -> Option<Node> {
        let mut node = self.nodes.remove(id)?;

        for edge_id in self.incident.remove(id).unwrap_or_default() {
            self.remove_edge(&edge_id);
        }
        if let Some(key) = &node.canonical_key
            && self.by_canonical.get(key).is_some_and(|owner| owner == id)
        {
            self.by_canonical.remove(key);
        }
        if let Some(embedding) = &node.embedding {
            for bucket in embedding.buckets() {
                if let Some(ids) = self.by_bucket.get_mut(&bucket) {
                    ids.remove(id);
                    if ids.is_empty() {
                        self.by_bucket.remove(&bucket);
                    }
                }
            }
        }

        node.degree = 0;
        self.dirty = true;
        Some(node)
    }

    /// Takes ownership of a node detached from another store.
    ///
    /// A node whose canonical key already exists merges into the local node;
    /// otherwise it is inserted as-is with no edges.
    pub fn adopt_node(
        &mut self,
        mut node: Node,
        opts: MergeOptions,
    ) -> Result<Adoption, HippoError> {
        let now = self.clock.tick();

        let existing = node
            .canonical_key
            .as_ref()
            .and_then(|key| self.by_canonical.get(key))
            .cloned();

        if let Some(id) = existing {
            if let Some(local) = self.nodes.get_mut(&id) {
                if opts.carry_weights {
                    local.weights.feedback +=
                        node.weights.feedback + node.weights.repeat * ADOPT_REPEAT_SHARE;
                }
                local.last_access = now;
                if let Some(generation) = opts.generation {
                    local.generation = generation;
                    local.generation_updated_at = now;
                }
            }
            self.dirty = true;
            self.evict();
            return Ok(Adoption { id, merged: true });
        }

        if self.nodes.contains_key(&node.id) {
            return Err(HippoError::DuplicateNode { id: node.id });
        }

        node.degree = 0;
        if let Some(generation) = opts.generation {
            node.generation = generation;
            node.generation_updated_at = now;
        }
        self.clock.observe(node.last_access);
        let id = node.id.clone();
        self.insert_node(node);
        self.dirty = true;
        self.evict();
        Ok(Adoption { id, merged: false })
    }

    // --- accessors -----------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Outgoing edges of `id`, sorted by edge id.
    pub fn edges_from(&self, id: &str) -> Vec<&Edge> {
        let mut out: Vec<&Edge> = self
            .incident
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
            .filter(|edge| edge.from == id)
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Edges touching `id` in either direction, sorted by edge id.
    pub fn edges_touching(&self, id: &str) -> Vec<&Edge> {
        let mut out: Vec<&Edge> = self
            .incident
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Id of the node owning a canonical key.
    pub fn find_by_canonical(&self, key: &str) -> Option<&str> {
        self.by_canonical.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current rank of a node.
    pub fn rank(&self, id: &str) -> Option<f64> {
        let node = self.nodes.get(id)?;
        Some(rank(node, self.clock.peek(), self.config.half_life_min))
    }

    /// Query nodes with `rank >= min_rank` and `degree >= min_degree`, best
    /// first (ties by id), at most `limit`.
    pub fn top_queries(
        &self,
        min_rank: f64,
        min_degree: usize,
        limit: usize,
    ) -> Vec<(String, f64)> {
        let now = self.clock.peek();
        let mut ranked: Vec<(String, f64)> = self
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Query && n.degree >= min_degree)
            .map(|n| (n.id.clone(), rank(n, now, self.config.half_life_min)))
            .filter(|(_, r)| *r >= min_rank)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Texts of entity nodes, most recently accessed first, at most `limit`.
    pub fn entity_texts(&self, limit: usize) -> Vec<String> {
        let mut entities: Vec<&Node> = self
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Entity)
            .collect();
        entities.sort_by(|a, b| b.last_access.cmp(&a.last_access).then_with(|| a.id.cmp(&b.id)));
        entities
            .into_iter()
            .take(limit)
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            dirty: self.dirty,
            ..GraphStats::default()
        };
        for node in self.nodes.values() {
            match node.kind {
                NodeKind::Query => stats.queries += 1,
                NodeKind::Feedback => stats.feedback += 1,
                NodeKind::Entity => stats.entities += 1,
                NodeKind::Answer => {}
            }
            match node.generation {
                Generation::Young => stats.young += 1,
                Generation::Old => stats.old += 1,
            }
        }
        stats
    }

    // --- snapshots -----------------------------------------------------------

    /// Dumps the whole graph. Nodes are ordered by creation time, edges by id.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let mut edges: Vec<Edge> = self.edges.values().cloned().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        GraphSnapshot {
            graph: GraphData { nodes, edges },
            embedder: self.embedder.export_state(),
            canonical_meta: self.canonicalizer.meta(),
        }
    }

    /// Replaces the whole graph with a snapshot.
    ///
    /// Indices are rebuilt, degrees recomputed from the edges, and edges with a
    /// missing endpoint dropped. Fails before touching the graph when the
    /// snapshot was made with an incompatible embedder or normalization.
    pub fn from_snapshot(&mut self, snapshot: GraphSnapshot) -> Result<(), HippoError> {
        if snapshot.canonical_meta.norm_version != NORM_VERSION {
            return Err(HippoError::Snapshot(format!(
                "unsupported normalization version {}",
                snapshot.canonical_meta.norm_version
            )));
        }
        if snapshot.canonical_meta.hash_algo != CANONICAL_HASH_ALGO {
            return Err(HippoError::Snapshot(format!(
                "unsupported canonical hash {}",
                snapshot.canonical_meta.hash_algo
            )));
        }
        if let Some(state) = &snapshot.embedder {
            let mut embedder = self.embedder.boxed_clone();
            embedder.import_state(state)?;
            self.embedder = embedder;
        }
        self.canonicalizer = Canonicalizer::new(snapshot.canonical_meta.seed);

        self.nodes.clear();
        self.edges.clear();
        self.by_canonical.clear();
        self.incident.clear();
        self.by_bucket.clear();

        for mut node in snapshot.graph.nodes {
            node.degree = 0;
            self.clock.observe(node.last_access.max(node.created_at));
            self.insert_node(node);
        }

        let mut dangling = 0usize;
        for edge in snapshot.graph.edges {
            if !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to) {
                dangling += 1;
                continue;
            }
            self.clock.observe(edge.last_access);
            self.attach_edge(edge);
        }
        if dangling > 0 {
            debug!(dangling, "dropped snapshot edges with missing endpoints");
        }

        self.dirty = true;
        Ok(())
    }

    /// Writes the snapshot as JSON. With `only_if_dirty`, a clean store is not
    /// written. Returns whether a file was written; clears the dirty flag.
    pub async fn save_to_file(
        &mut self,
        path: &Path,
        only_if_dirty: bool,
    ) -> Result<bool, HippoError> {
        if only_if_dirty && !self.dirty {
            return Ok(false);
        }
        let snapshot = self.to_snapshot();
        snapshot::write_json(path, &snapshot).await?;
        self.dirty = false;
        info!(
            path = %path.display(),
            nodes = snapshot.graph.nodes.len(),
            edges = snapshot.graph.edges.len(),
            "graph snapshot saved"
        );
        Ok(true)
    }

    /// Builds a store from a snapshot file. The loaded store starts clean.
    pub async fn load_from_file(
        path: &Path,
        config: GraphStoreConfig,
        embedder: Box<dyn EmbeddingProvider>,
    ) -> Result<Self, HippoError> {
        let snapshot: GraphSnapshot = snapshot::read_json(path).await?;
        let mut store = Self::new(config, embedder);
        store.from_snapshot(snapshot)?;
        store.dirty = false;
        store.evict();
        info!(path = %path.display(), nodes = store.nodes.len(), "graph snapshot loaded");
        Ok(store)
    }

    // --- internals -----------------------------------------------------------

    fn insert_node(&mut self, node: Node) {
        if let Some(key) = &node.canonical_key {
            self.by_canonical
                .entry(key.clone())
                .or_insert_with(|| node.id.clone());
        }
        if node.kind == NodeKind::Query
            && let Some(embedding) = &node.embedding
        {
            for bucket in embedding.buckets() {
                self.by_bucket
                    .entry(bucket)
                    .or_default()
                    .insert(node.id.clone());
            }
        }
        self.incident.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    /// Creates an edge or adds `weight` to the existing edge of the same triple.
    fn put_edge(&mut self, from: &str, to: &str, kind: EdgeKind, weight: f64, now: i64) {
        let id = Edge::key(from, kind, to);
        if let Some(edge) = self.edges.get_mut(&id) {
            edge.weight += weight;
            edge.last_access = now;
            return;
        }
        self.attach_edge(Edge {
            id,
            from: from.to_string(),
            to: to.to_string(),
            kind,
            weight,
            created_at: now,
            last_access: now,
        });
    }

    fn attach_edge(&mut self, edge: Edge) {
        if self.edges.contains_key(&edge.id) {
            return;
        }
        for endpoint in [&edge.from, &edge.to] {
            if self
                .incident
                .entry(endpoint.clone())
                .or_default()
                .insert(edge.id.clone())
                && let Some(node) = self.nodes.get_mut(endpoint)
            {
                node.degree += 1;
            }
        }
        self.edges.insert(edge.id.clone(), edge);
    }

    fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let edge = self.edges.remove(edge_id)?;
        for endpoint in [&edge.from, &edge.to] {
            if let Some(ids) = self.incident.get_mut(endpoint)
                && ids.remove(edge_id)
                && let Some(node) = self.nodes.get_mut(endpoint)
            {
                node.degree = node.degree.saturating_sub(1);
            }
        }
        Some(edge)
    }

    /// Restores `nodes <= max_nodes` and `edges <= max_edges`.
    ///
    /// Node candidates are non-pinned nodes below `protect_min_degree`; young
    /// ones go first, each bucket in ascending rank. Edges go in ascending
    /// `(weight, last_access)` order without re-checking node protection.
    fn evict(&mut self) {
        let mut evicted_nodes = 0usize;
        let mut evicted_edges = 0usize;

        if self.nodes.len() > self.config.max_nodes {
            let excess = self.nodes.len() - self.config.max_nodes;
            let now = self.clock.peek();
            let half_life = self.config.half_life_min;
            let mut young: Vec<(f64, String)> = Vec::new();
            let mut old: Vec<(f64, String)> = Vec::new();
            for node in self.nodes.values() {
                if node.pinned || node.degree >= self.config.protect_min_degree {
                    continue;
                }
                let entry = (rank(node, now, half_life), node.id.clone());
                match node.generation {
                    Generation::Young => young.push(entry),
                    Generation::Old => old.push(entry),
                }
            }
            let by_rank = |a: &(f64, String), b: &(f64, String)| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.1.cmp(&b.1))
            };
            young.sort_by(by_rank);
            old.sort_by(by_rank);

            for (_, id) in young.into_iter().chain(old).take(excess) {
                if self.detach_node(&id).is_some() {
                    evicted_nodes += 1;
                }
            }
        }

        if self.edges.len() > self.config.max_edges {
            let excess = self.edges.len() - self.config.max_edges;
            let mut order: Vec<(f64, i64, String)> = self
                .edges
                .values()
                .map(|e| (e.weight, e.last_access, e.id.clone()))
                .collect();
            order.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.1.cmp(&b.1))
                    .then_with(|| a.2.cmp(&b.2))
            });
            for (_, _, id) in order.into_iter().take(excess) {
                if self.remove_edge(&id).is_some() {
                    evicted_edges += 1;
                }
            }
        }

        if evicted_nodes > 0 || evicted_edges > 0 {
            self.dirty = true;
            debug!(
                evicted_nodes,
                evicted_edges,
                nodes = self.nodes.len(),
                edges = self.edges.len(),
                "eviction pass"
            );
        }
    }
}
