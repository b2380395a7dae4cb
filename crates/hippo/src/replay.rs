// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hippo replay` command implementation.
//!
//! Replays a transcript into one session and finalizes it. Each non-empty
//! line is a query; `!up`, `!down` and `!retry` record feedback on the
//! previous query; lines starting with `#` are comments.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use hippo_config::model::HippoConfig;
use hippo_core::traits::TagExtractor;
use hippo_core::{FeedbackLabel, HippoError};
use hippo_memory::{FinalizeOptions, HashedNgramEmbedder, KeywordTagExtractor, MemoryOrchestrator};
use tracing::{info, warn};

pub struct ReplayOptions {
    pub session: String,
    pub agent_snapshot: Option<PathBuf>,
    pub promote: bool,
    pub checkpoint: bool,
}

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Query(&'a str),
    Feedback(FeedbackLabel),
}

fn parse_line(line: &str) -> Option<Line<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Some(label) = line.strip_prefix('!')
        && let Ok(label) = FeedbackLabel::from_str(label.trim())
    {
        return Some(Line::Feedback(label));
    }
    Some(Line::Query(line))
}

/// Run the `hippo replay` command.
pub async fn run_replay(
    mut config: HippoConfig,
    file: &Path,
    opts: ReplayOptions,
) -> Result<(), HippoError> {
    if let Some(path) = &opts.agent_snapshot {
        config.storage.agent_snapshot_path = Some(path.display().to_string());
    }
    let transcript = tokio::fs::read_to_string(file).await?;

    let embedder = HashedNgramEmbedder::from_config(&config.embedder)?;
    let extractor: Arc<dyn TagExtractor> = Arc::new(KeywordTagExtractor::new());
    let orch = MemoryOrchestrator::open(config, Box::new(embedder), Some(extractor)).await?;
    let session = opts.session.as_str();

    let mut last_query: Option<String> = None;
    let mut queries = 0usize;
    for (number, line) in transcript.lines().enumerate() {
        match parse_line(line) {
            Some(Line::Query(text)) => {
                last_query = Some(orch.upsert_query(session, text).await?);
                queries += 1;
            }
            Some(Line::Feedback(label)) => match &last_query {
                Some(id) => {
                    orch.record_feedback(session, id, label, None).await?;
                }
                None => warn!(line = number + 1, "feedback before any query ignored"),
            },
            None => {}
        }
    }
    info!(session, queries, "transcript replayed");

    let report = orch
        .finalize_session(
            session,
            FinalizeOptions {
                promote: opts.promote,
                checkpoint: opts.checkpoint,
                checkpoint_name: None,
            },
        )
        .await?;
    let saved = orch.save_agent_store(true).await? || report.agent_saved;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !saved && orch.config().storage.agent_snapshot_path.is_none() {
        eprintln!("note: no agent snapshot path configured, agent store not saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_queries_feedback_and_comments() {
        assert_eq!(parse_line("  how do I tune tokio  "), Some(Line::Query("how do I tune tokio")));
        assert_eq!(parse_line("!up"), Some(Line::Feedback(FeedbackLabel::Up)));
        assert_eq!(parse_line("! retry"), Some(Line::Feedback(FeedbackLabel::Retry)));
        assert_eq!(parse_line("# a comment"), None);
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn unknown_bang_line_is_a_query() {
        assert_eq!(parse_line("!important question"), Some(Line::Query("!important question")));
    }

    #[tokio::test]
    async fn replay_promotes_liked_queries() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("session.txt");
        std::fs::write(
            &transcript,
            "# warmup\nexplain rust lifetimes\n!up\nwhat is a borrow checker\n",
        )
        .unwrap();

        let mut config = HippoConfig::default();
        config.checkpoint.dir = dir.path().join("checkpoints").display().to_string();
        let agent = dir.path().join("agent.json");

        run_replay(
            config,
            &transcript,
            ReplayOptions {
                session: "demo".into(),
                agent_snapshot: Some(agent.clone()),
                promote: true,
                checkpoint: true,
            },
        )
        .await
        .unwrap();

        assert!(agent.exists());
        assert!(dir.path().join("checkpoints/default/demo.json").exists());
    }
}
