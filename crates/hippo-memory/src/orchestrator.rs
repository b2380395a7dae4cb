// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-tier memory: short-lived session graphs over one long-lived agent graph.
//!
//! The orchestrator owns:
//! - **Agent store**: durable graph, optionally persisted to a snapshot file
//! - **Session stores**: created lazily per session id, discarded on finalize
//! - **Tagging pipelines**: one per session when tagging is enabled
//!
//! Hot session queries are promoted into the agent store when a session is
//! finalized, together with their tags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hippo_config::model::{HippoConfig, PromotionConfig};
use hippo_core::error::HippoError;
use hippo_core::traits::{EmbeddingProvider, TagExtractor};
use hippo_core::types::FeedbackLabel;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::checkpoint::{build_checkpoint, write_checkpoint};
use crate::store::GraphStore;
use crate::tagging::{SharedStore, TaggingPipeline};
use crate::types::{EdgeKind, Generation, MergeOptions, SearchHit};

/// Which store a search hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Session,
    Agent,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Session => "session",
            Scope::Agent => "agent",
        }
    }
}

/// A search hit tagged with its source store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedHit {
    pub id: String,
    pub sim: f64,
    pub score: f64,
    pub text: String,
    pub canonical_key: Option<String>,
    pub scope: Scope,
}

/// Selection and merge parameters for promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionOptions {
    pub max_promotions: usize,
    pub min_rank: f64,
    pub min_degree: usize,
    pub carry_weights: bool,
}

impl From<&PromotionConfig> for PromotionOptions {
    fn from(config: &PromotionConfig) -> Self {
        Self {
            max_promotions: config.max_promotions,
            min_rank: config.min_rank,
            min_degree: config.min_degree,
            carry_weights: config.carry_weights,
        }
    }
}

/// One session node moved into the agent store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotedNode {
    pub session_node_id: String,
    /// Id in the agent store. Differs from the session id on merge.
    pub agent_node_id: String,
    pub merged: bool,
    pub tags_linked: usize,
}

/// What `finalize_session` should do besides discarding the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOptions {
    pub promote: bool,
    pub checkpoint: bool,
    /// File stem of the checkpoint. Defaults to the session id.
    pub checkpoint_name: Option<String>,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            promote: true,
            checkpoint: true,
            checkpoint_name: None,
        }
    }
}

/// Outcome of `finalize_session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizeReport {
    pub promoted: Vec<PromotedNode>,
    pub agent_saved: bool,
    pub checkpoint_path: Option<PathBuf>,
}

#[derive(Clone)]
struct SessionEntry {
    store: SharedStore,
    tagging: Option<Arc<TaggingPipeline>>,
}

/// Session and agent memory graphs behind one async API.
pub struct MemoryOrchestrator {
    config: HippoConfig,
    embedder: Box<dyn EmbeddingProvider>,
    extractor: Option<Arc<dyn TagExtractor>>,
    agent: SharedStore,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl MemoryOrchestrator {
    /// Creates an orchestrator with an empty agent store.
    ///
    /// Every store gets its own copy of `embedder`. Without an extractor,
    /// tagging is off regardless of configuration.
    pub fn new(
        config: HippoConfig,
        embedder: Box<dyn EmbeddingProvider>,
        extractor: Option<Arc<dyn TagExtractor>>,
    ) -> Self {
        let agent = GraphStore::new(config.graph.agent.clone(), embedder.boxed_clone())
            .with_canonical_seed(config.embedder.canonical_seed);
        Self::with_agent_store(config, embedder, extractor, agent)
    }

    /// Like [`new`](Self::new), but restores the agent store from
    /// `storage.agent_snapshot_path` when that file exists.
    pub async fn open(
        config: HippoConfig,
        embedder: Box<dyn EmbeddingProvider>,
        extractor: Option<Arc<dyn TagExtractor>>,
    ) -> Result<Self, HippoError> {
        let Some(path) = config.storage.agent_snapshot_path.clone() else {
            return Ok(Self::new(config, embedder, extractor));
        };
        let path = PathBuf::from(path);
        if !tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "no agent snapshot yet, starting empty");
            return Ok(Self::new(config, embedder, extractor));
        }
        let agent =
            GraphStore::load_from_file(&path, config.graph.agent.clone(), embedder.boxed_clone())
                .await?;
        Ok(Self::with_agent_store(config, embedder, extractor, agent))
    }

    fn with_agent_store(
        config: HippoConfig,
        embedder: Box<dyn EmbeddingProvider>,
        extractor: Option<Arc<dyn TagExtractor>>,
        agent: GraphStore,
    ) -> Self {
        Self {
            config,
            embedder,
            extractor,
            agent: Arc::new(Mutex::new(agent)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.config.agent.id
    }

    pub fn config(&self) -> &HippoConfig {
        &self.config
    }

    pub fn agent_store(&self) -> SharedStore {
        Arc::clone(&self.agent)
    }

    /// The session store for `session_id`, created on first use.
    pub async fn session_store(&self, session_id: &str) -> SharedStore {
        self.session_entry(session_id).await.store
    }

    /// The session store for `session_id` if the session exists.
    pub async fn existing_session(&self, session_id: &str) -> Option<SharedStore> {
        self.existing_entry(session_id).await.map(|entry| entry.store)
    }

    /// Ids of live sessions, sorted.
    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Records a query in the session graph and queues it for tagging.
    pub async fn upsert_query(&self, session_id: &str, text: &str) -> Result<String, HippoError> {
        let entry = self.session_entry(session_id).await;
        let id = entry.store.lock().await.upsert_query(text)?;
        if let Some(tagging) = &entry.tagging {
            tagging.push(id.clone(), text.to_string()).await;
        }
        Ok(id)
    }

    /// Attaches feedback to a query of an existing session.
    pub async fn record_feedback(
        &self,
        session_id: &str,
        query_id: &str,
        label: FeedbackLabel,
        note: Option<&str>,
    ) -> Result<String, HippoError> {
        let Some(store) = self.existing_session(session_id).await else {
            return Err(HippoError::NodeNotFound {
                id: query_id.to_string(),
            });
        };
        let mut store = store.lock().await;
        store.record_feedback(query_id, label, note)
    }

    /// Searches the session store (if any) and the agent store.
    ///
    /// Session hits get `search.bias_session_first` added to their score.
    /// Hits sharing a canonical key collapse to the best-scoring one.
    pub async fn search(&self, session_id: &str, text: &str, k: Option<usize>) -> Vec<ScopedHit> {
        let k = k.unwrap_or(self.config.search.default_k);
        if k == 0 {
            return Vec::new();
        }
        let session_hits = match self.existing_session(session_id).await {
            Some(store) => store.lock().await.search_similar_queries(text, k),
            None => Vec::new(),
        };
        let agent_hits = self.agent.lock().await.search_similar_queries(text, k);
        merge_hits(
            session_hits,
            agent_hits,
            self.config.search.bias_session_first,
            k,
        )
    }

    /// Submits the partial tag batch of a session and waits for all batches.
    pub async fn flush_tagging(&self, session_id: &str) {
        if let Some(SessionEntry {
            tagging: Some(tagging),
            ..
        }) = self.existing_entry(session_id).await
        {
            tagging.flush().await;
        }
    }

    /// Waits for scheduled tag batches of a session.
    pub async fn wait_for_tagging(&self, session_id: &str) {
        if let Some(SessionEntry {
            tagging: Some(tagging),
            ..
        }) = self.existing_entry(session_id).await
        {
            tagging.wait().await;
        }
    }

    /// Moves the hottest session queries into the agent store.
    ///
    /// Promoted nodes become old-generation. Their tag links are recreated in
    /// the agent store with the original edge weights.
    pub async fn promote_hotspots_from_session(
        &self,
        session_id: &str,
        opts: PromotionOptions,
    ) -> Result<Vec<PromotedNode>, HippoError> {
        let Some(entry) = self.existing_entry(session_id).await else {
            return Ok(Vec::new());
        };
        if let Some(tagging) = &entry.tagging {
            tagging.flush().await;
        }

        let mut session = entry.store.lock().await;
        let mut agent = self.agent.lock().await;

        let merge = MergeOptions {
            generation: Some(Generation::Old),
            carry_weights: opts.carry_weights,
        };
        let selected = session.top_queries(opts.min_rank, opts.min_degree, opts.max_promotions);
        let mut tag_ids: HashMap<String, String> = HashMap::new();
        let mut promoted = Vec::with_capacity(selected.len());

        for (session_node_id, _) in selected {
            let tags: Vec<(String, f64)> = session
                .edges_from(&session_node_id)
                .into_iter()
                .filter(|edge| edge.kind == EdgeKind::RefersToEntity)
                .filter_map(|edge| session.node(&edge.to).map(|tag| (tag.text.clone(), edge.weight)))
                .collect();

            let Some(candidate) = session.node(&session_node_id) else {
                continue;
            };
            let merges = candidate
                .canonical_key
                .as_deref()
                .is_some_and(|key| agent.find_by_canonical(key).is_some());
            if !merges && agent.contains(&session_node_id) {
                return Err(HippoError::DuplicateNode {
                    id: session_node_id,
                });
            }

            let Some(node) = session.detach_node(&session_node_id) else {
                continue;
            };
            let adoption = agent.adopt_node(node, merge)?;
            agent.promote_generation(&adoption.id, Generation::Old);

            let mut tags_linked = 0usize;
            for (tag, weight) in tags {
                let cached = tag_ids.get(&tag).filter(|id| agent.contains(id)).cloned();
                let tag_id = match cached {
                    Some(id) => id,
                    None => {
                        let upsert = agent.upsert_tag(&tag, merge)?;
                        tag_ids.insert(tag, upsert.id.clone());
                        upsert.id
                    }
                };
                if agent.link_tag_to_query(&tag_id, &adoption.id, weight) {
                    tags_linked += 1;
                }
            }

            debug!(
                session = session_id,
                from = %session_node_id,
                to = %adoption.id,
                merged = adoption.merged,
                tags_linked,
                "promoted query"
            );
            promoted.push(PromotedNode {
                session_node_id,
                agent_node_id: adoption.id,
                merged: adoption.merged,
                tags_linked,
            });
        }

        info!(
            session = session_id,
            promoted = promoted.len(),
            agent_nodes = agent.len(),
            "session hotspots promoted"
        );
        Ok(promoted)
    }

    /// Ends a session: flushes tagging, optionally promotes and checkpoints,
    /// then drops the session graph.
    pub async fn finalize_session(
        &self,
        session_id: &str,
        opts: FinalizeOptions,
    ) -> Result<FinalizeReport, HippoError> {
        let Some(entry) = self.existing_entry(session_id).await else {
            debug!(session = session_id, "finalize of unknown session ignored");
            return Ok(FinalizeReport::default());
        };
        if let Some(tagging) = &entry.tagging {
            tagging.flush().await;
        }

        // Promotion detaches the hottest queries, so summarize them first.
        let checkpoint = if opts.checkpoint {
            let promotion = &self.config.promotion;
            let store = entry.store.lock().await;
            Some(build_checkpoint(
                &store,
                self.agent_id(),
                session_id,
                promotion.min_rank,
                promotion.min_degree,
                self.config.checkpoint.top_k,
            ))
        } else {
            None
        };

        let mut report = FinalizeReport::default();
        if opts.promote {
            report.promoted = self
                .promote_hotspots_from_session(
                    session_id,
                    PromotionOptions::from(&self.config.promotion),
                )
                .await?;
            if !report.promoted.is_empty() {
                report.agent_saved = self.save_agent_store(true).await?;
            }
        }

        if let Some(checkpoint) = checkpoint {
            let name = opts.checkpoint_name.as_deref().unwrap_or(session_id);
            let dir = Path::new(&self.config.checkpoint.dir);
            report.checkpoint_path = Some(write_checkpoint(dir, name, &checkpoint).await?);
        }

        self.sessions.lock().await.remove(session_id);
        info!(
            session = session_id,
            promoted = report.promoted.len(),
            agent_saved = report.agent_saved,
            checkpoint = ?report.checkpoint_path,
            "session finalized"
        );
        Ok(report)
    }

    /// Writes the agent store to `storage.agent_snapshot_path`.
    ///
    /// Returns whether a file was written. Always `false` without a path.
    pub async fn save_agent_store(&self, only_if_dirty: bool) -> Result<bool, HippoError> {
        let Some(path) = &self.config.storage.agent_snapshot_path else {
            return Ok(false);
        };
        self.agent
            .lock()
            .await
            .save_to_file(Path::new(path), only_if_dirty)
            .await
    }

    async fn existing_entry(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    async fn session_entry(&self, session_id: &str) -> SessionEntry {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| self.new_session(session_id))
            .clone()
    }

    fn new_session(&self, session_id: &str) -> SessionEntry {
        let store = GraphStore::new(self.config.graph.session.clone(), self.embedder.boxed_clone())
            .with_canonical_seed(self.config.embedder.canonical_seed);
        let store: SharedStore = Arc::new(Mutex::new(store));

        let tagging = match &self.extractor {
            Some(extractor) if self.config.tagging.enabled => Some(Arc::new(TaggingPipeline::new(
                session_id,
                Arc::clone(&store),
                Arc::clone(extractor),
                self.config.tagging.window,
                self.config.tagging.max_tags,
            ))),
            _ => None,
        };
        debug!(
            session = session_id,
            tagging = tagging.is_some(),
            "session store created"
        );
        SessionEntry { store, tagging }
    }
}

/// Blends session and agent hits into one list of at most `k` entries.
fn merge_hits(
    session_hits: Vec<SearchHit>,
    agent_hits: Vec<SearchHit>,
    bias: f64,
    k: usize,
) -> Vec<ScopedHit> {
    let scoped = session_hits
        .into_iter()
        .map(|hit| scoped(hit, Scope::Session, bias))
        .chain(agent_hits.into_iter().map(|hit| scoped(hit, Scope::Agent, 0.0)));

    let mut best: HashMap<String, ScopedHit> = HashMap::new();
    for hit in scoped {
        let key = hit.canonical_key.clone().unwrap_or_else(|| hit.id.clone());
        match best.get(&key) {
            Some(current) if current.score >= hit.score => {}
            _ => {
                best.insert(key, hit);
            }
        }
    }

    let mut hits: Vec<ScopedHit> = best.into_values().collect();
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(k);
    hits
}

fn scoped(hit: SearchHit, scope: Scope, bias: f64) -> ScopedHit {
    ScopedHit {
        id: hit.id,
        sim: hit.sim,
        score: hit.score + bias,
        text: hit.text,
        canonical_key: hit.canonical_key,
        scope,
    }
}
