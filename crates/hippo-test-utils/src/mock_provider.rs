// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockCompletionProvider` implements `CompletionProvider` with pre-configured
//! responses, so LLM-backed tagging can be tested without network calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hippo_core::HippoError;
use hippo_core::traits::CompletionProvider;

/// A mock LLM that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Prompts are recorded.
pub struct MockCompletionProvider {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(Ok(text));
    }

    /// Queue a provider error.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// Prompts received so far.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn next_response(&self) -> Result<String, String> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn complete(&self, prompt: &str) -> Result<String, HippoError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.next_response().await.map_err(HippoError::provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockCompletionProvider::new();
        assert_eq!(provider.complete("hi").await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider =
            MockCompletionProvider::with_responses(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(provider.complete("a").await.unwrap(), "first");
        assert_eq!(provider.complete("b").await.unwrap(), "second");
        // Queue exhausted, falls back to default
        assert_eq!(provider.complete("c").await.unwrap(), "mock response");
        assert_eq!(provider.prompts().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn queued_failure_is_a_provider_error() {
        let provider = MockCompletionProvider::new();
        provider.add_failure("rate limited").await;
        provider.add_response("after".to_string()).await;
        let err = provider.complete("x").await.unwrap_err();
        assert!(matches!(err, HippoError::Provider { .. }));
        assert_eq!(provider.complete("y").await.unwrap(), "after");
    }
}
