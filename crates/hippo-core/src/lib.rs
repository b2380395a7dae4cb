// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hippo memory graph.
//!
//! This crate provides the error type, the shared value types and the
//! collaborator traits (embedding, tag extraction, completion) used
//! throughout the Hippo workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HippoError;
pub use types::{
    CanonicalMeta, EmbedderState, FeedbackLabel, SparseVector, TagRequest, cosine_similarity,
};

pub use traits::{CompletionProvider, EmbeddingProvider, TagExtractor};
