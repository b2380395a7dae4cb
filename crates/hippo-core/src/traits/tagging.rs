// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag extractor trait used by the per-session tagging pipeline.

use async_trait::async_trait;

use crate::error::HippoError;
use crate::types::TagRequest;

/// Derives short entity/topic tags from a batch of query texts.
#[async_trait]
pub trait TagExtractor: Send + Sync {
    /// Returns at most `request.max_tags` tags. Returned tags may repeat
    /// entries of `request.existing`; the graph store merges them by key.
    async fn extract(&self, request: TagRequest) -> Result<Vec<String>, HippoError>;
}
