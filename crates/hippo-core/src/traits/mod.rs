// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits plugged into the graph stores and orchestrator.
//!
//! The embedder is synchronous and cheap to clone into each store. Tag
//! extraction and completion are async and use `#[async_trait]` so they can
//! be held as trait objects.

pub mod embedding;
pub mod provider;
pub mod tagging;

pub use embedding::EmbeddingProvider;
pub use provider::CompletionProvider;
pub use tagging::TagExtractor;
