// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the graph stores and collaborator traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Feedback a user gives on a query's answer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLabel {
    Up,
    Down,
    Retry,
}

impl FeedbackLabel {
    /// Amount added to the query's feedback weight.
    pub fn nudge(&self) -> f64 {
        match self {
            FeedbackLabel::Up => 1.0,
            FeedbackLabel::Down => -1.0,
            FeedbackLabel::Retry => -0.5,
        }
    }
}

/// A sparse vector of `(bucket, weight)` pairs, sorted by bucket.
///
/// Serializes as `[[bucket, weight], ...]`. Deserialization re-sorts and merges
/// duplicate buckets so imported vectors keep the ordering invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(u32, f32)>")]
pub struct SparseVector(Vec<(u32, f32)>);

impl From<Vec<(u32, f32)>> for SparseVector {
    fn from(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_by_key(|(bucket, _)| *bucket);
        let mut merged: Vec<(u32, f32)> = Vec::with_capacity(entries.len());
        for (bucket, weight) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == bucket => *acc += weight,
                _ => merged.push((bucket, weight)),
            }
        }
        SparseVector(merged)
    }
}

impl SparseVector {
    /// Builds an L2-normalized vector from raw per-bucket counts.
    pub fn normalized(counts: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let SparseVector(mut entries) = SparseVector::from(counts.into_iter().collect::<Vec<_>>());
        let norm = entries
            .iter()
            .map(|(_, w)| (*w as f64) * (*w as f64))
            .sum::<f64>()
            .sqrt();
        if norm > f64::EPSILON {
            for (_, w) in &mut entries {
                *w = (*w as f64 / norm) as f32;
            }
        }
        SparseVector(entries)
    }

    /// The `(bucket, weight)` pairs in bucket order.
    pub fn entries(&self) -> &[(u32, f32)] {
        &self.0
    }

    /// Iterates over the non-zero buckets.
    pub fn buckets(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().map(|(bucket, _)| *bucket)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|(_, w)| (*w as f64) * (*w as f64))
            .sum::<f64>()
            .sqrt()
    }

    /// Merge-join dot product over the shared buckets.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (a, b) = (&self.0, &other.0);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 as f64 * b[j].1 as f64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Compute cosine similarity between two sparse vectors.
///
/// Returns 0.0 when either vector is empty.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    a.dot(b) / denom
}

/// Replayable embedder configuration stored alongside snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedderState {
    pub kind: String,
    pub dim: u32,
    pub min_n: usize,
    pub max_n: usize,
    pub seed: u64,
    pub norm_version: String,
    pub hash_algo: String,
}

/// Describes how canonical keys were derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMeta {
    pub norm_version: String,
    pub hash_algo: String,
    pub seed: u64,
}

/// Input handed to a tag extractor for one batch of queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRequest {
    /// Query texts of the batch, oldest first.
    pub texts: Vec<String>,
    /// Tags already present in the session graph.
    pub existing: Vec<String>,
    /// Upper bound on the number of tags returned.
    pub max_tags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn feedback_label_nudges() {
        assert_eq!(FeedbackLabel::Up.nudge(), 1.0);
        assert_eq!(FeedbackLabel::Down.nudge(), -1.0);
        assert_eq!(FeedbackLabel::Retry.nudge(), -0.5);
    }

    #[test]
    fn feedback_label_parses_lowercase() {
        assert_eq!(FeedbackLabel::from_str("up").unwrap(), FeedbackLabel::Up);
        assert_eq!(FeedbackLabel::from_str("retry").unwrap(), FeedbackLabel::Retry);
        assert_eq!(FeedbackLabel::Down.to_string(), "down");
        assert!(FeedbackLabel::from_str("sideways").is_err());
    }

    #[test]
    fn sparse_vector_serializes_as_pairs() {
        let v = SparseVector::from(vec![(7, 0.5), (2, 0.25)]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[[2,0.25],[7,0.5]]");
    }

    #[test]
    fn sparse_vector_deserialize_sorts_and_merges() {
        let v: SparseVector = serde_json::from_str("[[9,1.0],[3,0.5],[9,1.0]]").unwrap();
        assert_eq!(v.entries(), &[(3, 0.5), (9, 2.0)]);
    }

    #[test]
    fn normalized_has_unit_norm() {
        let v = SparseVector::normalized(vec![(1, 3.0), (4, 4.0)]);
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert!((v.entries()[0].1 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        let v = SparseVector::normalized(Vec::new());
        assert!(v.is_empty());
        assert_eq!(cosine_similarity(&v, &v), 0.0);
    }

    #[test]
    fn cosine_of_disjoint_vectors_is_zero() {
        let a = SparseVector::normalized(vec![(1, 1.0)]);
        let b = SparseVector::normalized(vec![(2, 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn tag_request_default_is_empty() {
        let req = TagRequest::default();
        assert!(req.texts.is_empty());
        assert_eq!(req.max_tags, 0);
    }

    proptest! {
        #[test]
        fn cosine_is_symmetric_and_bounded(
            a in proptest::collection::vec((0u32..64, 0.01f32..10.0), 1..20),
            b in proptest::collection::vec((0u32..64, 0.01f32..10.0), 1..20),
        ) {
            let a = SparseVector::normalized(a);
            let b = SparseVector::normalized(b);
            let ab = cosine_similarity(&a, &b);
            let ba = cosine_similarity(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9);
            prop_assert!(ab <= 1.0 + 1e-6);
            prop_assert!(ab >= 0.0);
        }
    }
}
