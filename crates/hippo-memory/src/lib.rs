// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded memory graphs for the Hippo agent memory.
//!
//! ## Architecture
//!
//! - **HashedNgramEmbedder**: deterministic sparse embeddings from character n-grams
//! - **Canonicalizer**: exact-duplicate keys for queries and tags
//! - **GraphStore**: bounded graph with dedup, similarity links, ranking and eviction
//! - **TaggingPipeline**: per-session, strictly sequential tag batches
//! - **KeywordTagExtractor / LlmTagExtractor**: tag extraction backends
//! - **MemoryOrchestrator**: session stores over one agent store, promotion and checkpoints

pub mod canonical;
pub mod checkpoint;
pub mod embedder;
pub mod extractor;
pub mod orchestrator;
pub mod rank;
pub mod snapshot;
pub mod store;
pub mod tagging;
pub mod types;

pub use canonical::Canonicalizer;
pub use embedder::HashedNgramEmbedder;
pub use extractor::{KeywordTagExtractor, LlmTagExtractor};
pub use orchestrator::{
    FinalizeOptions, FinalizeReport, MemoryOrchestrator, PromotedNode, PromotionOptions, Scope,
    ScopedHit,
};
pub use store::GraphStore;
pub use tagging::{SharedStore, TaggingPipeline};
pub use types::*;
