//! Top-N similarity ranking of stored posting vectors.
//!
//! Ranks every index entry against the profile vector by cosine similarity
//! and returns the best `n` in descending order. Ranking is a pure linear
//! scan; determinism matters more than speed at this scale.

use crate::store::IndexEntry;
use crate::types::RankedPosting;
use thiserror::Error;

/// Similarity ties within this distance are broken by ascending posting id,
/// keeping the ranking deterministic when vectors coincide.
const TIE_EPSILON: f32 = 1e-9;

#[derive(Debug, Error)]
pub enum RetrieverError {
    #[error("top-n must be greater than zero")]
    InvalidTopN,

    /// The profile vector and a stored vector disagree on dimensionality.
    /// The index was built with a different embedding model and must be
    /// rebuilt before matching can continue.
    #[error("dimension mismatch for entry '{id}': expected {expected}, found {found}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Ranks `entries` against `profile_vector` and returns the top `n`.
///
/// The result holds `min(n, entries.len())` postings in strictly descending
/// similarity order; entries whose similarities are within [`TIE_EPSILON`]
/// of each other are ordered by ascending id. An empty `entries` slice
/// yields an empty ranking, not an error.
pub fn retrieve(
    profile_vector: &[f32],
    entries: &[IndexEntry],
    n: usize,
) -> Result<Vec<RankedPosting>> {
    if n == 0 {
        return Err(RetrieverError::InvalidTopN);
    }
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let expected = profile_vector.len();
    let mut ranked = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.embedding.len() != expected {
            return Err(RetrieverError::DimensionMismatch {
                id: entry.id.clone(),
                expected,
                found: entry.embedding.len(),
            });
        }
        ranked.push(RankedPosting {
            id: entry.id.clone(),
            similarity: cosine_similarity(profile_vector, &entry.embedding),
        });
    }

    ranked.sort_by(|a, b| {
        if (a.similarity - b.similarity).abs() <= TIE_EPSILON {
            a.id.cmp(&b.id)
        } else {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        }
    });
    ranked.truncate(n);

    Ok(ranked)
}

/// Computes cosine similarity between two vectors.
///
/// Returns values from -1.0 (opposite) to 1.0 (identical), with 0.0
/// indicating orthogonal vectors. Returns 0.0 for mismatched lengths or
/// zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::content_hash;

    fn entry(id: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            content_hash: content_hash(id),
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_is_symmetric_and_bounded() {
        let a = vec![0.3, -0.7, 0.2];
        let b = vec![-0.1, 0.9, 0.5];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert_eq!(ab, ba);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_retrieve_orders_by_descending_similarity() {
        // Angles from the profile vector produce similarities
        // 0.9, 0.7, 0.5, 0.3, 0.1 for e, b, a, d, c respectively.
        let profile = vec![1.0, 0.0];
        let entries = vec![
            entry("a", vec![0.5, (1.0_f32 - 0.25).sqrt()]),
            entry("b", vec![0.7, (1.0_f32 - 0.49).sqrt()]),
            entry("c", vec![0.1, (1.0_f32 - 0.01).sqrt()]),
            entry("d", vec![0.3, (1.0_f32 - 0.09).sqrt()]),
            entry("e", vec![0.9, (1.0_f32 - 0.81).sqrt()]),
        ];

        let ranked = retrieve(&profile, &entries, 3).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e", "b", "a"]);
        assert!(ranked[0].similarity > ranked[1].similarity);
        assert!(ranked[1].similarity > ranked[2].similarity);
    }

    #[test]
    fn test_retrieve_breaks_exact_ties_by_ascending_id() {
        let profile = vec![1.0, 0.0];
        // Identical vectors produce exactly equal similarities.
        let entries = vec![
            entry("z", vec![1.0, 0.0]),
            entry("a", vec![1.0, 0.0]),
            entry("m", vec![1.0, 0.0]),
        ];

        let ranked = retrieve(&profile, &entries, 3).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_retrieve_never_returns_more_than_available() {
        let profile = vec![1.0, 0.0];
        let entries = vec![entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])];

        let ranked = retrieve(&profile, &entries, 10).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_retrieve_empty_entries_yields_empty_ranking() {
        let ranked = retrieve(&[1.0, 0.0], &[], 5).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_retrieve_rejects_zero_top_n() {
        let entries = vec![entry("a", vec![1.0])];
        let err = retrieve(&[1.0], &entries, 0).unwrap_err();
        assert!(matches!(err, RetrieverError::InvalidTopN));
    }

    #[test]
    fn test_retrieve_rejects_dimension_mismatch() {
        let entries = vec![entry("a", vec![1.0, 0.0]), entry("b", vec![1.0, 0.0, 0.0])];
        let err = retrieve(&[1.0, 0.0], &entries, 5).unwrap_err();
        match err {
            RetrieverError::DimensionMismatch { id, expected, found } => {
                assert_eq!(id, "b");
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
