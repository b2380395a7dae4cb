// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hippo - bounded memory graphs for chat agents.
//!
//! This is the binary entry point: inspection, search and replay of
//! memory-graph snapshots.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod replay;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hippo_config::model::HippoConfig;

/// Hippo - bounded memory graphs for chat agents.
#[derive(Parser, Debug)]
#[command(name = "hippo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print stats and the best-ranked queries of a snapshot.
    Inspect {
        snapshot: PathBuf,
        /// Number of top queries to list.
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
    /// Search a snapshot for queries similar to TEXT.
    Search {
        snapshot: PathBuf,
        text: String,
        /// Number of hits (defaults to search.default_k).
        #[arg(short = 'k')]
        k: Option<usize>,
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
    /// Feed a file of queries into one session, then finalize it.
    Replay {
        file: PathBuf,
        /// Session id to replay into.
        #[arg(long, default_value = "replay")]
        session: String,
        /// Agent snapshot to load and save (overrides storage.agent_snapshot_path).
        #[arg(long)]
        agent: Option<PathBuf>,
        /// Skip promotion into the agent store.
        #[arg(long)]
        no_promote: bool,
        /// Skip writing a checkpoint.
        #[arg(long)]
        no_checkpoint: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => hippo_config::load_and_validate_path(path),
        None => hippo_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            hippo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Inspect {
            snapshot,
            top,
            json,
        }) => inspect::run_inspect(&config, &snapshot, top, json).await,
        Some(Commands::Search {
            snapshot,
            text,
            k,
            json,
        }) => search::run_search(&config, &snapshot, &text, k, json).await,
        Some(Commands::Replay {
            file,
            session,
            agent,
            no_promote,
            no_checkpoint,
        }) => {
            let opts = replay::ReplayOptions {
                session,
                agent_snapshot: agent,
                promote: !no_promote,
                checkpoint: !no_checkpoint,
            };
            replay::run_replay(config, &file, opts).await
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("hippo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &HippoConfig) -> Result<(), hippo_core::HippoError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| hippo_core::HippoError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hippo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_prints_as_toml() {
        let rendered = toml::to_string_pretty(&HippoConfig::default()).unwrap();
        assert!(rendered.contains("[graph.session]"));
        assert!(rendered.contains("[tagging]"));
    }

    #[test]
    fn cli_parses_replay_flags() {
        let cli = Cli::parse_from([
            "hippo",
            "replay",
            "queries.txt",
            "--session",
            "s1",
            "--no-promote",
        ]);
        match cli.command {
            Some(Commands::Replay {
                session,
                no_promote,
                no_checkpoint,
                ..
            }) => {
                assert_eq!(session, "s1");
                assert!(no_promote);
                assert!(!no_checkpoint);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_search_k() {
        let cli = Cli::parse_from(["hippo", "search", "agent.json", "rust", "-k", "3"]);
        assert!(matches!(cli.command, Some(Commands::Search { k: Some(3), .. })));
    }
}
