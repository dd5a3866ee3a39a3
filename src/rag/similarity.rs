//! Vector similarity and ranking.

/// Guards the denominator against zero-norm vectors.
pub const EPSILON: f32 = 1e-8;

/// Cosine similarity `(a·b) / (‖a‖·‖b‖ + ε)`.
///
/// Vectors of different length are not comparable and score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot_product / (norm_a * norm_b + EPSILON)
}

/// Score every candidate against `query`, sort descending and keep `top_k`.
///
/// The sort is stable, so candidates with equal scores keep their input
/// order. `top_k <= 0` yields nothing.
pub fn rank_by_similarity<T, F>(query: &[f32], candidates: Vec<T>, top_k: i64, embedding_of: F) -> Vec<(T, f32)>
where
    F: Fn(&T) -> &[f32],
{
    if top_k <= 0 {
        return Vec::new();
    }

    let mut scored: Vec<(T, f32)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = cosine_similarity(query, embedding_of(&candidate));
            (candidate, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k as usize);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Identical vectors
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);

        // Orthogonal vectors
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);

        // Opposite vectors
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_is_symmetric() {
        let a = [0.3, -1.2, 4.0, 0.5];
        let b = [2.0, 0.1, -0.7, 1.5];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_vector_does_not_divide_by_zero() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert!(score.is_finite());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_descending_and_truncates() {
        let candidates = vec![
            ("far", vec![0.0, 1.0]),
            ("near", vec![1.0, 0.0]),
            ("close", vec![0.9, 0.1]),
        ];
        let ranked = rank_by_similarity(&[1.0, 0.0], candidates, 2, |c| &c.1);
        let names: Vec<&str> = ranked.iter().map(|(c, _)| c.0).collect();
        assert_eq!(names, vec!["near", "close"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let candidates = vec![("first", vec![1.0, 0.0]), ("second", vec![2.0, 0.0])];
        let ranked = rank_by_similarity(&[1.0, 0.0], candidates, 5, |c| &c.1);
        assert_eq!(ranked[0].0 .0, "first");
        assert_eq!(ranked[1].0 .0, "second");
    }

    #[test]
    fn test_rank_non_positive_top_k_is_empty() {
        let candidates = vec![("a", vec![1.0])];
        assert!(rank_by_similarity(&[1.0], candidates.clone(), 0, |c| &c.1).is_empty());
        assert!(rank_by_similarity(&[1.0], candidates, -3, |c| &c.1).is_empty());
    }
}
