// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical keys: the exact-duplicate identity of queries and tags.

use hippo_core::types::CanonicalMeta;
use sha2::{Digest, Sha256};

use crate::embedder::{NORM_VERSION, normalize_text};

/// Hash tag recorded in [`CanonicalMeta`].
pub const CANONICAL_HASH_ALGO: &str = "sha256-64";

const QUERY_PREFIX: &str = "q:";
const TAG_PREFIX: &str = "t:";

/// Derives canonical keys from normalized text.
///
/// A key is the prefix followed by the hex of the first 8 bytes of
/// `SHA-256(seed || normVersion || normalized text)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Canonicalizer {
    seed: u64,
}

impl Canonicalizer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Key for a query text.
    pub fn query_key(&self, text: &str) -> String {
        self.key(QUERY_PREFIX, text)
    }

    /// Key for a tag text. Never collides with a query key.
    pub fn tag_key(&self, text: &str) -> String {
        self.key(TAG_PREFIX, text)
    }

    pub fn meta(&self) -> CanonicalMeta {
        CanonicalMeta {
            norm_version: NORM_VERSION.to_string(),
            hash_algo: CANONICAL_HASH_ALGO.to_string(),
            seed: self.seed,
        }
    }

    fn key(&self, prefix: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(NORM_VERSION.as_bytes());
        hasher.update(normalize_text(text).as_bytes());
        let digest = hasher.finalize();
        format!("{prefix}{}", hex::encode(&digest[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_spacing_do_not_change_the_key() {
        let c = Canonicalizer::default();
        assert_eq!(c.query_key("AgentOS MVP 설계"), c.query_key("agentos  mvp 설계"));
        assert_ne!(c.query_key("agentos mvp"), c.query_key("agentos mvp 설계"));
    }

    #[test]
    fn key_shape() {
        let key = Canonicalizer::default().query_key("hello");
        assert!(key.starts_with("q:"));
        assert_eq!(key.len(), 2 + 16);
    }

    #[test]
    fn tag_and_query_spaces_are_disjoint() {
        let c = Canonicalizer::default();
        let q = c.query_key("rust");
        let t = c.tag_key("rust");
        assert!(t.starts_with("t:"));
        assert_eq!(q[2..], t[2..]);
        assert_ne!(q, t);
    }

    #[test]
    fn seed_changes_keys() {
        assert_ne!(
            Canonicalizer::new(1).query_key("hello"),
            Canonicalizer::new(2).query_key("hello")
        );
    }

    #[test]
    fn meta_reports_seed() {
        let meta = Canonicalizer::new(9).meta();
        assert_eq!(meta.seed, 9);
        assert_eq!(meta.hash_algo, "sha256-64");
        assert_eq!(meta.norm_version, NORM_VERSION);
    }
}
