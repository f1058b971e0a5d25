//! Offline evaluation of recommendation quality.

use std::collections::HashSet;

use catalog::CourseId;
use serde::Serialize;

/// Result of evaluating one user's recommendations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub k: usize,
    pub recommended: Vec<CourseId>,
    /// Courses the user has interacted with
    pub relevant: Vec<CourseId>,
    pub precision: f64,
}

/// Precision@K: the share of the first `k` recommendations that are relevant.
///
/// The denominator is always `k`, even when fewer than `k` courses were
/// recommended. Returns 0.0 for `k == 0`.
pub fn precision_at_k(recommended: &[CourseId], relevant: &HashSet<CourseId>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let top_k: HashSet<CourseId> = recommended.iter().take(k).copied().collect();
    let hits = top_k.intersection(relevant).count();
    hits as f64 / k as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_at_k() {
        let relevant: HashSet<CourseId> = [1, 3, 7].into_iter().collect();

        assert_eq!(precision_at_k(&[1, 2, 3, 4, 5], &relevant, 5), 0.4);
        assert_eq!(precision_at_k(&[1, 2, 3, 4, 5], &relevant, 1), 1.0);
        assert_eq!(precision_at_k(&[2, 4], &relevant, 5), 0.0);
    }

    #[test]
    fn test_short_list_uses_k_as_denominator() {
        let relevant: HashSet<CourseId> = [1].into_iter().collect();
        assert_eq!(precision_at_k(&[1], &relevant, 4), 0.25);
    }

    #[test]
    fn test_zero_k() {
        let relevant: HashSet<CourseId> = [1].into_iter().collect();
        assert_eq!(precision_at_k(&[1], &relevant, 0), 0.0);
    }
}
