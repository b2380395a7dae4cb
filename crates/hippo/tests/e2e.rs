// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `hippo` binary.

use std::path::Path;
use std::process::{Command, Output};

fn hippo(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hippo"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run hippo binary")
}

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("hippo.toml");
    let checkpoints = dir.join("checkpoints");
    let agent = dir.join("agent.json");
    std::fs::write(
        &path,
        format!(
            "[agent]\nid = \"e2e\"\n\n[checkpoint]\ndir = {:?}\n\n[storage]\nagent_snapshot_path = {:?}\n{extra}",
            checkpoints.display().to_string(),
            agent.display().to_string(),
        ),
    )
    .unwrap();
    path
}

#[test]
fn config_command_prints_effective_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "\n[tagging]\nwindow = 7\n");

    let output = hippo(&config, &["config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("id = \"e2e\""));
    assert!(stdout.contains("window = 7"));
}

#[test]
fn invalid_config_exits_with_code_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "\n[tagging]\nwindw = 7\n");

    let output = hippo(&config, &["config"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn replay_then_inspect_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let transcript = dir.path().join("transcript.txt");
    std::fs::write(
        &transcript,
        "how do I pin a future in rust\n!up\nsqlite write ahead log\n",
    )
    .unwrap();

    let replay = hippo(
        &config,
        &["replay", transcript.to_str().unwrap(), "--session", "s1"],
    );
    assert!(replay.status.success(), "{}", String::from_utf8_lossy(&replay.stderr));
    let report: serde_json::Value = serde_json::from_slice(&replay.stdout).unwrap();
    assert_eq!(report["promoted"].as_array().unwrap().len(), 1);
    assert!(dir.path().join("checkpoints/e2e/s1.json").exists());

    let agent = dir.path().join("agent.json");
    let inspect = hippo(&config, &["inspect", agent.to_str().unwrap(), "--json"]);
    assert!(inspect.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&inspect.stdout).unwrap();
    assert_eq!(summary["stats"]["queries"], 1);
    assert_eq!(
        summary["top_queries"][0]["text"],
        "how do I pin a future in rust"
    );
    assert_eq!(summary["top_queries"][0]["generation"], "old");

    let search = hippo(
        &config,
        &["search", agent.to_str().unwrap(), "pin a future", "-k", "1", "--json"],
    );
    assert!(search.status.success());
    let hits: serde_json::Value = serde_json::from_slice(&search.stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["text"], "how do I pin a future in rust");
}

#[test]
fn inspect_missing_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let output = hippo(&config, &["inspect", "does-not-exist.json"]);
    assert_eq!(output.status.code(), Some(1));
}
