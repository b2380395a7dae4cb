// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hashed character n-gram embedder.
//!
//! Stands in for a learned embedding model: deterministic, dependency-free at
//! runtime, and replayable from the state stored in snapshots.

use std::collections::BTreeMap;

use hippo_config::model::EmbedderConfig;
use hippo_core::error::HippoError;
use hippo_core::traits::EmbeddingProvider;
use hippo_core::types::{EmbedderState, SparseVector};
use unicode_normalization::UnicodeNormalization;

/// Identifies this embedder in exported state.
pub const EMBEDDER_KIND: &str = "hashed-ngram";

/// Version tag of [`normalize_text`]. Also feeds canonical keys.
pub const NORM_VERSION: &str = "nfc-lower-punct-v1";

/// Version tag of the bucket hash.
pub const HASH_ALGO: &str = "fnv1a64-fmix64-fold32";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Punctuation kept by normalization; everything else non-alphanumeric becomes a space.
const KEPT_PUNCTUATION: [char; 6] = ['-', '_', '+', '#', '@', '.'];

/// Normalize text for embedding and canonicalization.
///
/// NFC, lowercase, punctuation outside [`KEPT_PUNCTUATION`] replaced by spaces,
/// whitespace runs collapsed to a single space, ends trimmed.
pub fn normalize_text(text: &str) -> String {
    let lowered: String = text.nfc().collect::<String>().to_lowercase();
    let mapped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character n-grams of lengths `min_n..=max_n` over already-normalized text.
///
/// Text shorter than `min_n` characters yields itself as the only gram;
/// empty text yields nothing.
pub fn char_ngrams(normalized: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() < min_n {
        return vec![normalized.to_string()];
    }
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n > chars.len() {
            break;
        }
        grams.extend(chars.windows(n).map(|w| w.iter().collect::<String>()));
    }
    grams
}

/// Seeded FNV-1a with a MurmurHash3 `fmix64` finish, xor-folded to 32 bits.
pub fn hash_gram(gram: &str, seed: u64) -> u32 {
    let mut h = FNV_OFFSET_BASIS ^ seed;
    for byte in gram.as_bytes() {
        h ^= u64::from(*byte);
        h = h.wrapping_mul(FNV_PRIME);
    }
    let h = fmix64(h);
    ((h >> 32) as u32) ^ (h as u32)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// Sparse hashed n-gram embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedNgramEmbedder {
    dim: u32,
    min_n: usize,
    max_n: usize,
    seed: u64,
}

impl HashedNgramEmbedder {
    /// Creates an embedder, rejecting a zero dimension or an empty n-gram range.
    pub fn new(dim: u32, min_n: usize, max_n: usize, seed: u64) -> Result<Self, HippoError> {
        if dim == 0 {
            return Err(HippoError::Config("embedder dim must be at least 1".into()));
        }
        if min_n == 0 || min_n > max_n {
            return Err(HippoError::Config(format!(
                "embedder n-gram range {min_n}..{max_n} is empty"
            )));
        }
        Ok(Self {
            dim,
            min_n,
            max_n,
            seed,
        })
    }

    /// Creates an embedder from the `[embedder]` config section.
    pub fn from_config(config: &EmbedderConfig) -> Result<Self, HippoError> {
        Self::new(config.dim, config.min_n, config.max_n, config.seed)
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        (self.min_n, self.max_n)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self {
            dim: 16384,
            min_n: 3,
            max_n: 5,
            seed: 0x9E37_79B9,
        }
    }
}

impl EmbeddingProvider for HashedNgramEmbedder {
    fn embed(&self, text: &str) -> SparseVector {
        let normalized = normalize_text(text);
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for gram in char_ngrams(&normalized, self.min_n, self.max_n) {
            let bucket = hash_gram(&gram, self.seed) % self.dim;
            *counts.entry(bucket).or_insert(0.0) += 1.0;
        }
        SparseVector::normalized(counts)
    }

    fn export_state(&self) -> Option<EmbedderState> {
        Some(EmbedderState {
            kind: EMBEDDER_KIND.to_string(),
            dim: self.dim,
            min_n: self.min_n,
            max_n: self.max_n,
            seed: self.seed,
            norm_version: NORM_VERSION.to_string(),
            hash_algo: HASH_ALGO.to_string(),
        })
    }

    fn import_state(&mut self, state: &EmbedderState) -> Result<(), HippoError> {
        if state.kind != EMBEDDER_KIND
            || state.norm_version != NORM_VERSION
            || state.hash_algo != HASH_ALGO
        {
            return Err(HippoError::Snapshot(format!(
                "incompatible embedder state {}/{}/{}",
                state.kind, state.norm_version, state.hash_algo
            )));
        }
        *self = Self::new(state.dim, state.min_n, state.max_n, state.seed)
            .map_err(|e| HippoError::Snapshot(e.to_string()))?;
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn EmbeddingProvider> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hippo_core::types::cosine_similarity;
    use proptest::prelude::*;

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize_text("  Hello,   World!! "), "hello world");
        assert_eq!(normalize_text("C++ & C#"), "c++ c#");
        assert_eq!(normalize_text("user@host.io: ok?"), "user@host.io ok");
        assert_eq!(normalize_text("AgentOS MVP 설계"), "agentos mvp 설계");
    }

    #[test]
    fn normalize_composes_unicode() {
        // "e" followed by a combining acute accent
        let decomposed = "cafe\u{0301}";
        assert_eq!(normalize_text(decomposed), "caf\u{e9}");
    }

    #[test]
    fn ngrams_cover_range() {
        let grams = char_ngrams("abcd", 3, 5);
        assert_eq!(grams, vec!["abc", "bcd", "abcd"]);
    }

    #[test]
    fn short_text_is_a_single_gram() {
        assert_eq!(char_ngrams("ab", 3, 5), vec!["ab"]);
        assert!(char_ngrams("", 3, 5).is_empty());
    }

    #[test]
    fn hash_depends_on_seed() {
        assert_eq!(hash_gram("abc", 1), hash_gram("abc", 1));
        assert_ne!(hash_gram("abc", 1), hash_gram("abc", 2));
    }

    #[test]
    fn empty_text_embeds_to_empty_vector() {
        let embedder = HashedNgramEmbedder::default();
        assert!(embedder.embed("").is_empty());
        assert!(embedder.embed("  ?! ").is_empty());
    }

    #[test]
    fn identical_normalized_texts_embed_identically() {
        let embedder = HashedNgramEmbedder::default();
        let a = embedder.embed("Rust Borrow Checker");
        let b = embedder.embed("rust   borrow checker!");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn buckets_stay_below_dim() {
        let embedder = HashedNgramEmbedder::new(64, 2, 3, 5).unwrap();
        let v = embedder.embed("the quick brown fox jumps over the lazy dog");
        assert!(v.buckets().all(|b| b < 64));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(HashedNgramEmbedder::new(0, 3, 5, 0).is_err());
        assert!(HashedNgramEmbedder::new(16, 0, 5, 0).is_err());
        assert!(HashedNgramEmbedder::new(16, 4, 3, 0).is_err());
    }

    #[test]
    fn import_state_adopts_parameters() {
        let source = HashedNgramEmbedder::new(1024, 2, 4, 42).unwrap();
        let state = source.export_state().unwrap();
        let mut target = HashedNgramEmbedder::default();
        target.import_state(&state).unwrap();
        assert_eq!(target, source);
        assert_eq!(target.embed("replay me"), source.embed("replay me"));
    }

    #[test]
    fn import_state_rejects_foreign_kind() {
        let mut state = HashedNgramEmbedder::default().export_state().unwrap();
        state.kind = "onnx-minilm".to_string();
        let mut embedder = HashedNgramEmbedder::default();
        let err = embedder.import_state(&state).unwrap_err();
        assert!(matches!(err, HippoError::Snapshot(_)));
        assert_eq!(embedder, HashedNgramEmbedder::default());
    }

    proptest! {
        #[test]
        fn non_empty_embeddings_have_unit_norm(text in "[a-zA-Z0-9 ]{1,64}") {
            let embedder = HashedNgramEmbedder::default();
            let v = embedder.embed(&text);
            if !v.is_empty() {
                prop_assert!((v.norm() - 1.0).abs() < 1e-4);
            }
        }
    }
}
