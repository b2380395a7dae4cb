// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session checkpoint summaries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hippo_core::error::HippoError;

use crate::snapshot;
use crate::store::GraphStore;
use crate::types::{Checkpoint, CheckpointEdge, CheckpointQuery};

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Replaces path separators and other unsafe characters with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        _ => cleaned,
    }
}

/// `<dir>/<agent id>/<name>.json`, with both components sanitized.
pub fn checkpoint_path(dir: &Path, agent_id: &str, name: &str) -> PathBuf {
    dir.join(sanitize_file_name(agent_id))
        .join(format!("{}.json", sanitize_file_name(name)))
}

/// Summarizes the best-ranked queries of a session store.
///
/// Queries pass the same rank and degree filter as promotion, capped at
/// `top_k`. Only edges touching a selected query are included.
pub fn build_checkpoint(
    store: &GraphStore,
    agent_id: &str,
    session_id: &str,
    min_rank: f64,
    min_degree: usize,
    top_k: usize,
) -> Checkpoint {
    let top = store.top_queries(min_rank, min_degree, top_k);

    let mut top_queries = Vec::with_capacity(top.len());
    let mut edges = Vec::new();
    let mut seen_edges: HashSet<&str> = HashSet::new();
    for (id, _) in &top {
        let Some(node) = store.node(id) else { continue };
        top_queries.push(CheckpointQuery {
            id: node.id.clone(),
            text: node.text.clone(),
            last_access: node.last_access,
            weights: node.weights,
            degree: node.degree,
            canonical_key: node.canonical_key.clone(),
        });
        for edge in store.edges_touching(id) {
            if seen_edges.insert(edge.id.as_str()) {
                edges.push(CheckpointEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    kind: edge.kind,
                    weight: edge.weight,
                });
            }
        }
    }

    Checkpoint {
        version: CHECKPOINT_VERSION,
        agent_id: agent_id.to_string(),
        session_id: session_id.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        top_queries,
        edges,
        embedder: store.embedder().export_state(),
        canonical_meta: store.canonical_meta(),
    }
}

/// Writes a checkpoint under `dir` and returns its path.
pub async fn write_checkpoint(
    dir: &Path,
    name: &str,
    checkpoint: &Checkpoint,
) -> Result<PathBuf, HippoError> {
    let path = checkpoint_path(dir, &checkpoint.agent_id, name);
    snapshot::write_json(&path, checkpoint).await?;
    Ok(path)
}
