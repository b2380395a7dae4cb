// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hippo search` command implementation.

use std::path::Path;

use hippo_config::model::HippoConfig;
use hippo_core::HippoError;
use hippo_memory::SearchHit;

use crate::inspect::load_snapshot;

/// Run the `hippo search` command against one snapshot.
pub async fn run_search(
    config: &HippoConfig,
    path: &Path,
    text: &str,
    k: Option<usize>,
    json: bool,
) -> Result<(), HippoError> {
    let store = load_snapshot(config, path).await?;
    let hits = store.search_similar_queries(text, k.unwrap_or(config.search.default_k));

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print!("{}", format_hits(&hits));
    }
    Ok(())
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "no matches\n".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{:>2}. {:.3} (sim {:.3})  {}\n",
                i + 1,
                hit.score,
                hit.sim,
                hit.text
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbered_hits() {
        let hits = vec![SearchHit {
            id: "a".into(),
            sim: 0.5,
            score: 0.62,
            text: "tokio runtime".into(),
            canonical_key: None,
        }];
        assert_eq!(format_hits(&hits), " 1. 0.620 (sim 0.500)  tokio runtime\n");
        assert_eq!(format_hits(&[]), "no matches\n");
    }
}
