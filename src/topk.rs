//! Helpers over finished score vectors.

/// The `k` highest-scoring nodes as `(node, score)`, best first.
///
/// Equal scores keep ascending node order. NaN scores sort last.
pub fn top_k(scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
            .then(a.0.cmp(&b.0))
    });
    indexed.truncate(k);
    indexed
}

/// Rescales `scores` to sum to 1.
///
/// Returns the input unchanged when the sum is zero or not finite.
pub fn normalize(scores: &[f64]) -> Vec<f64> {
    let total: f64 = scores.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return scores.to_vec();
    }
    scores.iter().map(|x| x / total).collect()
}
