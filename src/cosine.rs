use crate::ngram::{NGram, MAX_ORDER};
use crate::tfidf::{OrderVectors, SparseVector};
use serde::{Deserialize, Serialize};

/// Added to the cosine denominator so all-zero vectors give 0.
pub const EPSILON: f64 = 1e-8;

/// Dense vectors over one sorted n-gram index.
#[derive(Debug, Clone)]
pub struct DenseOrder {
    pub index: Vec<NGram>,
    pub candidate: Vec<f64>,
    pub references: Vec<Vec<f64>>,
}

impl DenseOrder {
    /// Lay out the candidate's n-grams in sorted order and read every vector
    /// at those positions.
    pub fn from_sparse(vectors: &OrderVectors) -> Self {
        let mut index: Vec<NGram> = vectors.candidate.keys().cloned().collect();
        index.sort();

        let candidate = densify(&vectors.candidate, &index);
        let references = vectors.references.iter().map(|r| densify(r, &index)).collect();
        Self {
            index,
            candidate,
            references,
        }
    }

    /// Cosine similarity of the candidate against each reference.
    pub fn similarities(&self) -> Vec<f64> {
        self.references
            .iter()
            .map(|r| cosine_similarity(&self.candidate, r))
            .collect()
    }
}

fn densify(vector: &SparseVector, index: &[NGram]) -> Vec<f64> {
    index
        .iter()
        .map(|gram| vector.get(gram).copied().unwrap_or(0.0))
        .collect()
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// `dot(a, b) / (‖a‖·‖b‖ + ε)`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    dot(a, b) / (norm(a) * norm(b) + EPSILON)
}

/// Best match at one order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderScore {
    pub order: usize,
    pub similarity: f64,
    /// Reference that gave the best similarity, if there was any reference.
    pub best_reference: Option<usize>,
}

/// Max similarity over references at one order (0 with no references).
pub fn best_match(order: usize, similarities: &[f64]) -> OrderScore {
    let mut best = OrderScore {
        order,
        similarity: 0.0,
        best_reference: None,
    };
    for (i, &sim) in similarities.iter().enumerate() {
        if best.best_reference.is_none() || sim > best.similarity {
            best.similarity = sim;
            best.best_reference = Some(i);
        }
    }
    best
}

/// A candidate's consensus score and its per-order parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiderScore {
    pub per_order: [OrderScore; MAX_ORDER],
    pub score: f64,
}

impl CiderScore {
    /// Unweighted mean of the per-order best similarities.
    pub fn from_orders(per_order: [OrderScore; MAX_ORDER]) -> Self {
        let score = per_order.iter().map(|o| o.similarity).sum::<f64>() / MAX_ORDER as f64;
        Self { per_order, score }
    }

    pub fn similarity(&self, order: usize) -> Option<f64> {
        self.per_order.get(order.checked_sub(1)?).map(|o| o.similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_bounds() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), 0.0);
        let s = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn test_zero_vectors_give_exact_zero() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_densify_sorted_index() {
        let a = NGram::from_slice(&["a"]);
        let b = NGram::from_slice(&["b"]);
        let vectors = OrderVectors {
            candidate: [(b.clone(), 2.0), (a.clone(), 1.0)].into_iter().collect(),
            references: vec![[(b.clone(), 4.0), (a.clone(), 0.0)].into_iter().collect()],
        };
        let dense = DenseOrder::from_sparse(&vectors);
        assert_eq!(dense.index, vec![a, b]);
        assert_eq!(dense.candidate, vec![1.0, 2.0]);
        assert_eq!(dense.references[0], vec![0.0, 4.0]);
    }

    #[test]
    fn test_best_match_takes_max() {
        let best = best_match(2, &[0.2, 0.9, 0.5]);
        assert_eq!(best.similarity, 0.9);
        assert_eq!(best.best_reference, Some(1));

        let all_zero = best_match(1, &[0.0, 0.0]);
        assert_eq!(all_zero.best_reference, Some(0));
        assert_eq!(best_match(1, &[]).best_reference, None);
    }

    #[test]
    fn test_mean_over_all_orders() {
        let similarities = [1.0, 0.5, 0.0, 0.0];
        let orders: [OrderScore; MAX_ORDER] = std::array::from_fn(|i| OrderScore {
            order: i + 1,
            similarity: similarities[i],
            best_reference: Some(0),
        });
        let score = CiderScore::from_orders(orders);
        assert!((score.score - 0.375).abs() < 1e-12);
        assert_eq!(score.similarity(2), Some(0.5));
        assert_eq!(score.similarity(0), None);
        assert_eq!(score.similarity(5), None);
    }
}
