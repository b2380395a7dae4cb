// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering and non-zero bounds.

use crate::diagnostic::ConfigError;
use crate::model::{GraphStoreConfig, HippoConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HippoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.id.trim().is_empty() {
        errors.push(ConfigError::validation("agent.id must not be empty"));
    }

    let embedder = &config.embedder;
    if embedder.dim < 1 {
        errors.push(ConfigError::validation("embedder.dim must be at least 1"));
    }
    if embedder.min_n < 1 || embedder.min_n > embedder.max_n {
        errors.push(ConfigError::validation(format!(
            "embedder n-gram range must satisfy 1 <= min_n <= max_n, got {}..{}",
            embedder.min_n, embedder.max_n
        )));
    }

    validate_graph("graph.session", &config.graph.session, &mut errors);
    validate_graph("graph.agent", &config.graph.agent, &mut errors);

    let bias = config.search.bias_session_first;
    if bias.is_nan() || bias < 0.0 {
        errors.push(ConfigError::validation(format!(
            "search.bias_session_first must be non-negative, got {bias}"
        )));
    }

    if config.tagging.window < 1 {
        errors.push(ConfigError::validation("tagging.window must be at least 1"));
    }
    if config.tagging.max_tags < 1 {
        errors.push(ConfigError::validation("tagging.max_tags must be at least 1"));
    }

    if config.checkpoint.top_k < 1 {
        errors.push(ConfigError::validation("checkpoint.top_k must be at least 1"));
    }

    if let Some(path) = &config.storage.agent_snapshot_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "storage.agent_snapshot_path must not be empty when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_graph(section: &str, graph: &GraphStoreConfig, errors: &mut Vec<ConfigError>) {
    if graph.max_nodes < 1 {
        errors.push(ConfigError::validation(format!(
            "{section}.max_nodes must be at least 1"
        )));
    }
    if graph.max_edges < 1 {
        errors.push(ConfigError::validation(format!(
            "{section}.max_edges must be at least 1"
        )));
    }
    if graph.half_life_min.is_nan() || graph.half_life_min <= 0.0 {
        errors.push(ConfigError::validation(format!(
            "{section}.half_life_min must be positive, got {}",
            graph.half_life_min
        )));
    }
    let ordered = graph.tau_sim > 0.0 && graph.tau_sim <= graph.tau_dup && graph.tau_dup <= 1.0;
    if !ordered {
        errors.push(ConfigError::validation(format!(
            "{section} thresholds must satisfy 0 < tau_sim <= tau_dup <= 1, got tau_sim={} tau_dup={}",
            graph.tau_sim, graph.tau_dup
        )));
    }
}
