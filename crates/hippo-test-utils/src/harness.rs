// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for orchestrator integration tests.
//!
//! `TestHarness` owns a temp directory and a `HippoConfig` whose checkpoint
//! directory and agent snapshot path point into it.

use std::path::{Path, PathBuf};

use hippo_config::model::{GraphStoreConfig, HippoConfig};

/// A graph store config with small bounds and everything else at session defaults.
pub fn small_store_config(max_nodes: usize, max_edges: usize) -> GraphStoreConfig {
    GraphStoreConfig {
        max_nodes,
        max_edges,
        ..GraphStoreConfig::session()
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    agent_id: String,
    tagging: bool,
    window: usize,
    persist_agent: bool,
    session_store: Option<GraphStoreConfig>,
    min_rank: Option<f64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            agent_id: "test-agent".to_string(),
            tagging: true,
            window: 4,
            persist_agent: true,
            session_store: None,
            min_rank: None,
        }
    }

    pub fn with_agent_id(mut self, id: &str) -> Self {
        self.agent_id = id.to_string();
        self
    }

    /// Set the tagging window. A window of zero disables tagging.
    pub fn with_tagging_window(mut self, window: usize) -> Self {
        self.tagging = window > 0;
        self.window = window.max(1);
        self
    }

    /// Leave `storage.agent_snapshot_path` unset.
    pub fn without_agent_snapshot(mut self) -> Self {
        self.persist_agent = false;
        self
    }

    pub fn with_session_store(mut self, config: GraphStoreConfig) -> Self {
        self.session_store = Some(config);
        self
    }

    pub fn with_min_rank(mut self, min_rank: f64) -> Self {
        self.min_rank = Some(min_rank);
        self
    }

    /// Build the harness, creating the temp directory.
    pub fn build(self) -> std::io::Result<TestHarness> {
        let temp_dir = tempfile::TempDir::new()?;

        let mut config = HippoConfig::default();
        config.agent.id = self.agent_id;
        config.tagging.enabled = self.tagging;
        config.tagging.window = self.window;
        config.checkpoint.dir = temp_dir.path().join("checkpoints").to_string_lossy().into_owned();
        if self.persist_agent {
            config.storage.agent_snapshot_path = Some(
                temp_dir
                    .path()
                    .join("agent.json")
                    .to_string_lossy()
                    .into_owned(),
            );
        }
        if let Some(session) = self.session_store {
            config.graph.session = session;
        }
        if let Some(min_rank) = self.min_rank {
            config.promotion.min_rank = min_rank;
        }

        Ok(TestHarness {
            config,
            temp_dir,
        })
    }
}

/// A temp directory plus a config wired to it.
pub struct TestHarness {
    pub config: HippoConfig,
    /// Temp directory kept alive for cleanup on drop.
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.checkpoint.dir)
    }

    pub fn agent_snapshot_path(&self) -> Option<PathBuf> {
        self.config
            .storage
            .agent_snapshot_path
            .as_ref()
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_in_temp_dir() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.checkpoint_dir().starts_with(harness.root()));
        assert!(harness.agent_snapshot_path().unwrap().starts_with(harness.root()));
        assert_eq!(harness.config.agent.id, "test-agent");
    }

    #[test]
    fn zero_window_disables_tagging() {
        let harness = TestHarness::builder().with_tagging_window(0).build().unwrap();
        assert!(!harness.config.tagging.enabled);
        assert_eq!(harness.config.tagging.window, 1);
    }

    #[test]
    fn small_store_keeps_session_thresholds() {
        let config = small_store_config(30, 200);
        assert_eq!(config.max_nodes, 30);
        assert_eq!(config.max_edges, 200);
        assert_eq!(config.tau_dup, GraphStoreConfig::session().tau_dup);
    }
}
