// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider trait for deterministic text vectorization.

use crate::error::HippoError;
use crate::types::{EmbedderState, SparseVector};

/// Maps text to a sparse, L2-normalized vector.
///
/// Implementations must be deterministic: the same text under the same
/// exported state always yields the same vector, so snapshots replay
/// identically.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text`. Empty or whitespace-only text yields an empty vector.
    fn embed(&self, text: &str) -> SparseVector;

    /// Returns the state needed to reproduce this embedder, if any.
    fn export_state(&self) -> Option<EmbedderState>;

    /// Adopts the parameters from a snapshot.
    ///
    /// Fails with [`HippoError::Snapshot`] when the state was produced by an
    /// incompatible embedder.
    fn import_state(&mut self, state: &EmbedderState) -> Result<(), HippoError>;

    /// Clones the provider behind a fresh box.
    fn boxed_clone(&self) -> Box<dyn EmbeddingProvider>;
}

impl Clone for Box<dyn EmbeddingProvider> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
