// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session tagging pipeline.
//!
//! Queries are buffered until a window fills, then tagged as one batch on a
//! spawned task. Each batch waits for the previous batch of the same session,
//! so at most one extraction call per session is in flight.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use hippo_core::traits::TagExtractor;
use hippo_core::types::TagRequest;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::store::GraphStore;
use crate::types::MergeOptions;

/// A graph store shared between the orchestrator and background tasks.
pub type SharedStore = Arc<Mutex<GraphStore>>;

/// Known tags passed to the extractor with each batch.
const EXISTING_TAG_LIMIT: usize = 50;

/// Weight of a `refers_to_entity` edge created by tagging.
const TAG_LINK_WEIGHT: f64 = 1.0;

type Tail = Shared<BoxFuture<'static, ()>>;

fn idle_tail() -> Tail {
    futures::future::ready(()).boxed().shared()
}

struct PipelineState {
    buffer: Vec<(String, String)>,
    tail: Tail,
}

/// Window-based tag batching for one session store.
pub struct TaggingPipeline {
    session_id: String,
    store: SharedStore,
    extractor: Arc<dyn TagExtractor>,
    window: usize,
    max_tags: usize,
    state: Mutex<PipelineState>,
}

impl TaggingPipeline {
    pub fn new(
        session_id: impl Into<String>,
        store: SharedStore,
        extractor: Arc<dyn TagExtractor>,
        window: usize,
        max_tags: usize,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            store,
            extractor,
            window: window.max(1),
            max_tags,
            state: Mutex::new(PipelineState {
                buffer: Vec::new(),
                tail: idle_tail(),
            }),
        }
    }

    /// Buffers a query. Schedules a batch once the window is full.
    pub async fn push(&self, query_id: String, text: String) {
        let mut state = self.state.lock().await;
        state.buffer.push((query_id, text));
        if state.buffer.len() >= self.window {
            let batch = std::mem::take(&mut state.buffer);
            self.schedule(&mut state, batch);
        }
    }

    /// Submits any partial buffer as a final batch, then waits for all batches.
    pub async fn flush(&self) {
        let tail = {
            let mut state = self.state.lock().await;
            if !state.buffer.is_empty() {
                let batch = std::mem::take(&mut state.buffer);
                self.schedule(&mut state, batch);
            }
            state.tail.clone()
        };
        tail.await;
    }

    /// Waits for scheduled batches. Buffered queries stay buffered.
    pub async fn wait(&self) {
        let tail = self.state.lock().await.tail.clone();
        tail.await;
    }

    /// Number of buffered queries not yet scheduled.
    pub async fn pending(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    fn schedule(&self, state: &mut PipelineState, batch: Vec<(String, String)>) {
        let job = BatchJob {
            session_id: self.session_id.clone(),
            store: Arc::clone(&self.store),
            extractor: Arc::clone(&self.extractor),
            max_tags: self.max_tags,
            batch,
        };
        let previous = state.tail.clone();
        let handle = tokio::spawn(async move {
            previous.await;
            job.run().await;
        });

        let session_id = self.session_id.clone();
        state.tail = async move {
            if let Err(e) = handle.await {
                warn!(session = %session_id, error = %e, "tagging task aborted");
            }
        }
        .boxed()
        .shared();
    }
}

struct BatchJob {
    session_id: String,
    store: SharedStore,
    extractor: Arc<dyn TagExtractor>,
    max_tags: usize,
    batch: Vec<(String, String)>,
}

impl BatchJob {
    async fn run(self) {
        let (query_ids, texts): (Vec<String>, Vec<String>) = self.batch.into_iter().unzip();
        let existing = self.store.lock().await.entity_texts(EXISTING_TAG_LIMIT);
        let request = TagRequest {
            texts,
            existing,
            max_tags: self.max_tags,
        };

        let tags = match self.extractor.extract(request).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "tag extraction failed");
                return;
            }
        };

        let mut store = self.store.lock().await;
        let mut linked = 0usize;
        for tag in tags.iter().take(self.max_tags) {
            let upsert = match store.upsert_tag(tag, MergeOptions::default()) {
                Ok(upsert) => upsert,
                Err(e) => {
                    debug!(session = %self.session_id, error = %e, "skipping tag");
                    continue;
                }
            };
            for query_id in &query_ids {
                if store.link_tag_to_query(&upsert.id, query_id, TAG_LINK_WEIGHT) {
                    linked += 1;
                }
            }
        }
        debug!(
            session = %self.session_id,
            queries = query_ids.len(),
            tags = tags.len(),
            linked,
            "tag batch applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashedNgramEmbedder;
    use crate::types::{EdgeKind, NodeKind};
    use async_trait::async_trait;
    use hippo_config::model::GraphStoreConfig;
    use hippo_core::error::HippoError;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct Recording {
        calls: StdMutex<Vec<TagRequest>>,
        fail_first: bool,
    }

    #[async_trait]
    impl TagExtractor for Recording {
        async fn extract(&self, request: TagRequest) -> Result<Vec<String>, HippoError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(request);
                calls.len()
            };
            if self.fail_first && call == 1 {
                return Err(HippoError::provider("boom"));
            }
            Ok(vec!["rust".into(), "  ".into(), "memory".into()])
        }
    }

    fn store() -> SharedStore {
        Arc::new(Mutex::new(GraphStore::new(
            GraphStoreConfig::session(),
            Box::new(HashedNgramEmbedder::default()),
        )))
    }

    async fn insert(store: &SharedStore, text: &str) -> String {
        store.lock().await.upsert_query(text).unwrap()
    }

    #[tokio::test]
    async fn full_window_schedules_a_batch() {
        let store = store();
        let extractor = Arc::new(Recording::default());
        let pipeline = TaggingPipeline::new("s", store.clone(), extractor.clone(), 2, 5);

        let a = insert(&store, "how do lifetimes work").await;
        pipeline.push(a.clone(), "how do lifetimes work".into()).await;
        assert_eq!(pipeline.pending().await, 1);
        let b = insert(&store, "borrow checker errors explained").await;
        pipeline.push(b.clone(), "borrow checker errors explained".into()).await;
        assert_eq!(pipeline.pending().await, 0);
        pipeline.wait().await;

        let texts: Vec<Vec<String>> = extractor
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.texts.clone())
            .collect();
        assert_eq!(
            texts,
            vec![vec![
                "how do lifetimes work".to_string(),
                "borrow checker errors explained".to_string()
            ]]
        );

        let store = store.lock().await;
        let tags: Vec<_> = store.nodes().filter(|n| n.kind == NodeKind::Entity).collect();
        assert_eq!(tags.len(), 2);
        for id in [&a, &b] {
            let refs = store
                .edges_from(id)
                .into_iter()
                .filter(|e| e.kind == EdgeKind::RefersToEntity)
                .count();
            assert_eq!(refs, 2);
        }
    }

    #[tokio::test]
    async fn flush_submits_partial_buffer() {
        let store = store();
        let extractor = Arc::new(Recording::default());
        let pipeline = TaggingPipeline::new("s", store.clone(), extractor.clone(), 4, 5);

        let id = insert(&store, "partial window query").await;
        pipeline.push(id, "partial window query".into()).await;
        pipeline.wait().await;
        assert!(extractor.calls.lock().unwrap().is_empty());

        pipeline.flush().await;
        assert_eq!(extractor.calls.lock().unwrap().len(), 1);
        assert_eq!(pipeline.pending().await, 0);
    }

    #[tokio::test]
    async fn failed_batch_does_not_block_the_next() {
        let store = store();
        let extractor = Arc::new(Recording {
            fail_first: true,
            ..Default::default()
        });
        let pipeline = TaggingPipeline::new("s", store.clone(), extractor.clone(), 1, 5);

        let first = insert(&store, "first query text").await;
        pipeline.push(first.clone(), "first query text".into()).await;
        let second = insert(&store, "second unrelated sentence").await;
        pipeline.push(second.clone(), "second unrelated sentence".into()).await;
        pipeline.flush().await;

        assert_eq!(extractor.calls.lock().unwrap().len(), 2);
        let store = store.lock().await;
        let refs = |id: &str| {
            store
                .edges_from(id)
                .into_iter()
                .filter(|e| e.kind == EdgeKind::RefersToEntity)
                .count()
        };
        assert_eq!(refs(&first), 0);
        assert_eq!(refs(&second), 2);
    }

    #[tokio::test]
    async fn existing_tags_are_offered_to_the_extractor() {
        let store = store();
        store
            .lock()
            .await
            .upsert_tag("graphs", MergeOptions::default())
            .unwrap();
        let extractor = Arc::new(Recording::default());
        let pipeline = TaggingPipeline::new("s", store.clone(), extractor.clone(), 1, 5);

        let id = insert(&store, "graph databases").await;
        pipeline.push(id, "graph databases".into()).await;
        pipeline.wait().await;

        let calls = extractor.calls.lock().unwrap();
        assert_eq!(calls[0].existing, vec!["graphs".to_string()]);
        assert_eq!(calls[0].max_tags, 5);
    }
}
