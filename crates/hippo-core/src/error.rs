// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hippo memory graph.

use thiserror::Error;

/// The primary error type used across graph stores, the orchestrator and collaborator traits.
#[derive(Debug, Error)]
pub enum HippoError {
    /// Configuration errors (invalid values, inconsistent thresholds).
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot or checkpoint file errors (I/O failure, JSON encoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion or tag provider errors (API failure, malformed output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A node id was not present in the store.
    #[error("node not found: {id}")]
    NodeNotFound { id: String },

    /// A node id already exists in the destination store.
    #[error("node already exists: {id}")]
    DuplicateNode { id: String },

    /// Snapshot content cannot be replayed (incompatible embedder, bad shape).
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Caller supplied an invalid argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HippoError {
    /// Wraps any error as a [`HippoError::Storage`].
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HippoError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds a [`HippoError::Provider`] without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        HippoError::Provider {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for HippoError {
    fn from(err: std::io::Error) -> Self {
        HippoError::storage(err)
    }
}

impl From<serde_json::Error> for HippoError {
    fn from(err: serde_json::Error) -> Self {
        HippoError::storage(err)
    }
}
