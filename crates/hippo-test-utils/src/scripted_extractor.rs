// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted tag extractor for pipeline ordering tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hippo_core::HippoError;
use hippo_core::traits::TagExtractor;
use hippo_core::types::TagRequest;

/// A tag extractor that replays a script of results.
///
/// Each call pops the next scripted result; an exhausted script returns the
/// fallback tags. Every request is recorded, and the number of concurrent
/// calls is tracked so tests can assert single-flight behavior.
pub struct ScriptedTagExtractor {
    script: Mutex<VecDeque<Result<Vec<String>, String>>>,
    fallback: Vec<String>,
    latency: Option<Duration>,
    calls: Mutex<Vec<TagRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTagExtractor {
    /// An extractor that always returns `tags`.
    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: tags.iter().map(|t| t.to_string()).collect(),
            latency: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleeps for `latency` inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful result.
    pub async fn push_tags(&self, tags: &[&str]) {
        self.script
            .lock()
            .await
            .push_back(Ok(tags.iter().map(|t| t.to_string()).collect()));
    }

    /// Queue a failing call.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(message.into()));
    }

    /// Requests received so far, in call order.
    pub async fn calls(&self) -> Vec<TagRequest> {
        self.calls.lock().await.clone()
    }

    /// Texts of each received request, in call order.
    pub async fn batches(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|request| request.texts.clone())
            .collect()
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TagExtractor for ScriptedTagExtractor {
    async fn extract(&self, request: TagRequest) -> Result<Vec<String>, HippoError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().await.push(request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self.script.lock().await.pop_front();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match next {
            Some(Ok(tags)) => Ok(tags),
            Some(Err(message)) => Err(HippoError::provider(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}
