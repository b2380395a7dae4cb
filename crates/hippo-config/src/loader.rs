// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hippo.toml` > `~/.config/hippo/hippo.toml` > `/etc/hippo/hippo.toml`
//! with environment variable overrides via `HIPPO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HippoConfig;

/// Env var sections, longest first so `graph_session_` wins over shorter prefixes.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("graph_session_", "graph.session."),
    ("graph_agent_", "graph.agent."),
    ("agent_", "agent."),
    ("embedder_", "embedder."),
    ("search_", "search."),
    ("tagging_", "tagging."),
    ("promotion_", "promotion."),
    ("checkpoint_", "checkpoint."),
    ("storage_", "storage."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hippo/hippo.toml` (system-wide)
/// 3. `~/.config/hippo/hippo.toml` (user XDG config)
/// 4. `./hippo.toml` (local directory)
/// 5. `HIPPO_*` environment variables
pub fn load_config() -> Result<HippoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HippoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HippoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HippoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HippoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HippoConfig::default()))
        .merge(Toml::file("/etc/hippo/hippo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hippo/hippo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hippo.toml"))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name onto a dotted config key.
///
/// Only the leading section is split, so `graph_session_max_nodes` becomes
/// `graph.session.max_nodes` and `storage_agent_snapshot_path` stays
/// `storage.agent_snapshot_path`.
pub fn map_env_key(key: &str) -> String {
    for (prefix, dotted) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("HIPPO_").map(|key| map_env_key(key.as_str()).into())
}
