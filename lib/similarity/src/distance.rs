//! Similarity primitives
//!
//! Lexical comparisons used by fuzzy matching and the vector comparison used
//! by semantic ranking. Lexical scores are in [0.0, 1.0] where 1.0 means
//! identical.

use pricematch_core::{Result, Vector};
use rayon::prelude::*;

/// Cosine similarity of `query` against every candidate, in input order.
///
/// An empty candidate slice yields an empty score list. Any candidate whose
/// dimension differs from the query fails the whole call.
pub fn cosine_scores<V>(query: &Vector, candidates: &[V]) -> Result<Vec<f32>>
where
    V: AsRef<Vector> + Sync,
{
    candidates
        .par_iter()
        .map(|candidate| query.cosine_similarity(candidate.as_ref()))
        .collect()
}

/// Sequence-alignment ratio between two strings, case-insensitive.
///
/// Ratcliff/Obershelp: `2 * M / T` where `M` is the number of characters in
/// the matching blocks found by recursively taking the longest common
/// substring, and `T` the combined length. Two empty strings score 1.0.
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a, &b);
    2.0 * matched as f32 / total as f32
}

/// Case-insensitive substring test; an empty needle never matches
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, alo, ahi, b, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common run in `a[alo..ahi]` / `b[blo..bhi]`.
///
/// Ties resolve to the run that ends earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    alo: usize,
    ahi: usize,
    b: &[char],
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                curr[col] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                curr[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricematch_core::Error;

    #[test]
    fn test_sequence_ratio_identity() {
        assert_eq!(sequence_ratio("String Lights", "string lights"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        // "abcd" vs "bcde": one block "bcd" of 3 chars -> 6 / 8
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-6);
        // Query fully contained in the title
        let r = sequence_ratio("string lights", "Brightown 50ft Warm White LED String Lights");
        assert!((r - 26.0 / 56.0).abs() < 1e-6, "got {}", r);
    }

    #[test]
    fn test_sequence_ratio_recurses_both_sides() {
        // Blocks "ab" and "de" around a mismatched middle
        assert!((sequence_ratio("abXde", "abYde") - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_size_tokens_close() {
        assert!(sequence_ratio("50 ft", "50ft") > 0.8);
        assert!(sequence_ratio("50 ft", "12 ft") < 0.8);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Brightown 50ft LED", "brightown"));
        assert!(!contains_ignore_case("Brightown 50ft LED", "solarglow"));
        assert!(!contains_ignore_case("anything", "  "));
    }

    #[test]
    fn test_cosine_scores_order_and_empty() {
        let query = Vector::new(vec![1.0, 0.0]);
        let candidates = vec![
            Vector::new(vec![0.0, 1.0]),
            Vector::new(vec![1.0, 0.0]),
            Vector::new(vec![1.0, 1.0]),
        ];
        let scores = cosine_scores(&query, &candidates).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0].abs() < 1e-6);
        assert!((scores[1] - 1.0).abs() < 1e-6);
        assert!((scores[2] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);

        let none: Vec<Vector> = Vec::new();
        assert!(cosine_scores(&query, &none).unwrap().is_empty());
    }

    #[test]
    fn test_cosine_scores_dimension_mismatch() {
        let query = Vector::new(vec![1.0, 0.0]);
        let candidates = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0, 0.0, 0.0])];
        assert!(matches!(
            cosine_scores(&query, &candidates),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
