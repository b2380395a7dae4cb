// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for LLM-backed tag extraction.

use async_trait::async_trait;

use crate::error::HippoError;

/// A text-in, text-out language model endpoint.
///
/// Only single-shot completion is needed; the memory layer never streams.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name used in log fields.
    fn name(&self) -> &str;

    /// Sends `prompt` and returns the full completion text.
    async fn complete(&self, prompt: &str) -> Result<String, HippoError>;
}
