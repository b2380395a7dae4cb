// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Node ranking shared by search scoring and eviction ordering.

use crate::types::{Generation, Node};

const RECENCY_WEIGHT: f64 = 0.4;
const REPEAT_WEIGHT: f64 = 0.3;
const FEEDBACK_WEIGHT: f64 = 0.2;
const OLD_GENERATION_BONUS: f64 = 0.1;

/// Saturation scale for repeat and feedback weights.
const WEIGHT_SCALE: f64 = 5.0;

/// Rank of `node` at `now_ms`.
///
/// `0.4 * recency + 0.3 * tanh(repeat / 5) + 0.2 * tanh(feedback / 5)`, plus 0.1
/// for old-generation nodes. Recency halves every `half_life_min` minutes.
pub fn rank(node: &Node, now_ms: i64, half_life_min: f64) -> f64 {
    let age_min = (now_ms - node.last_access).max(0) as f64 / 60_000.0;
    let recency = (-std::f64::consts::LN_2 * age_min / half_life_min).exp();
    let repeat = (node.weights.repeat / WEIGHT_SCALE).tanh();
    let feedback = (node.weights.feedback / WEIGHT_SCALE).tanh();
    let bonus = match node.generation {
        Generation::Old => OLD_GENERATION_BONUS,
        Generation::Young => 0.0,
    };
    RECENCY_WEIGHT * recency + REPEAT_WEIGHT * repeat + FEEDBACK_WEIGHT * feedback + bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, Weights};

    fn node(last_access: i64, repeat: f64, feedback: f64, generation: Generation) -> Node {
        Node {
            id: "n".into(),
            kind: NodeKind::Query,
            text: String::new(),
            canonical_key: None,
            embedding: None,
            created_at: 0,
            last_access,
            weights: Weights { repeat, feedback },
            degree: 0,
            generation,
            generation_updated_at: 0,
            pinned: false,
        }
    }

    #[test]
    fn fresh_node_scores_recency_only() {
        let n = node(1_000, 0.0, 0.0, Generation::Young);
        assert!((rank(&n, 1_000, 30.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn recency_halves_after_half_life() {
        let n = node(0, 0.0, 0.0, Generation::Young);
        let r = rank(&n, 30 * 60_000, 30.0);
        assert!((r - 0.2).abs() < 1e-12);
    }

    #[test]
    fn old_generation_adds_bonus() {
        let young = node(0, 0.0, 0.0, Generation::Young);
        let old = node(0, 0.0, 0.0, Generation::Old);
        assert!((rank(&old, 0, 30.0) - rank(&young, 0, 30.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn negative_feedback_lowers_rank() {
        let liked = node(0, 0.0, 1.0, Generation::Young);
        let disliked = node(0, 0.0, -1.0, Generation::Young);
        assert!(rank(&liked, 0, 30.0) > 0.4);
        assert!(rank(&disliked, 0, 30.0) < 0.4);
    }

    #[test]
    fn weights_saturate() {
        let n = node(0, 1e6, 1e6, Generation::Old);
        assert!((rank(&n, 0, 30.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn future_access_is_treated_as_now() {
        let n = node(5_000, 0.0, 0.0, Generation::Young);
        assert!((rank(&n, 1_000, 30.0) - 0.4).abs() < 1e-12);
    }
}
