// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hippo inspect` command implementation.
//!
//! Loads a graph snapshot and prints its counters and the best-ranked
//! queries.

use std::path::Path;

use hippo_config::model::HippoConfig;
use hippo_core::HippoError;
use hippo_memory::{GraphStats, GraphStore, HashedNgramEmbedder};
use serde::Serialize;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub path: String,
    pub stats: GraphStats,
    pub top_queries: Vec<RankedQuery>,
}

#[derive(Debug, Serialize)]
pub struct RankedQuery {
    pub id: String,
    pub rank: f64,
    pub generation: &'static str,
    pub degree: usize,
    pub text: String,
}

/// Loads a snapshot file into an agent-scope store.
pub async fn load_snapshot(config: &HippoConfig, path: &Path) -> Result<GraphStore, HippoError> {
    let embedder = HashedNgramEmbedder::from_config(&config.embedder)?;
    GraphStore::load_from_file(path, config.graph.agent.clone(), Box::new(embedder)).await
}

/// Run the `hippo inspect` command.
pub async fn run_inspect(
    config: &HippoConfig,
    path: &Path,
    top: usize,
    json: bool,
) -> Result<(), HippoError> {
    let store = load_snapshot(config, path).await?;
    let response = InspectResponse {
        path: path.display().to_string(),
        stats: store.stats(),
        top_queries: ranked_queries(&store, top),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", format_inspect(&response));
    }
    Ok(())
}

fn ranked_queries(store: &GraphStore, top: usize) -> Vec<RankedQuery> {
    store
        .top_queries(f64::NEG_INFINITY, 0, top)
        .into_iter()
        .filter_map(|(id, rank)| {
            let node = store.node(&id)?;
            Some(RankedQuery {
                id,
                rank,
                generation: node.generation.as_str(),
                degree: node.degree,
                text: node.text.clone(),
            })
        })
        .collect()
}

fn format_inspect(response: &InspectResponse) -> String {
    let stats = &response.stats;
    let mut out = format!(
        "snapshot: {}\n  nodes: {} (queries {}, feedback {}, entities {})\n  edges: {}\n  generations: {} young, {} old\n",
        response.path,
        stats.nodes,
        stats.queries,
        stats.feedback,
        stats.entities,
        stats.edges,
        stats.young,
        stats.old,
    );
    if !response.top_queries.is_empty() {
        out.push_str("top queries:\n");
        for q in &response.top_queries {
            out.push_str(&format!(
                "  {:.3}  [{} deg {}]  {}\n",
                q.rank, q.generation, q.degree, q.text
            ));
        }
    }
    out
}
