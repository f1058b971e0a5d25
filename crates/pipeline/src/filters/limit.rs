//! Cap the result size.

use crate::traits::Filter;
use anyhow::Result;
use recommender::{Candidate, RatingProfile};

/// Keeps the first `max` candidates.
pub struct LimitFilter {
    max: usize,
}

impl LimitFilter {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Filter for LimitFilter {
    fn name(&self) -> &str {
        "LimitFilter"
    }

    fn apply(
        &self,
        mut candidates: Vec<Candidate>,
        _profile: &RatingProfile,
    ) -> Result<Vec<Candidate>> {
        candidates.truncate(self.max);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommender::CandidateSource;

    #[test]
    fn test_limit_filter() {
        let candidates: Vec<Candidate> = (1..=8)
            .map(|id| Candidate::new(id, CandidateSource::Priority, 5.0))
            .collect();
        let profile = RatingProfile::new(1);

        let filtered = LimitFilter::new(5).apply(candidates.clone(), &profile).unwrap();
        assert_eq!(filtered.len(), 5);
        assert_eq!(filtered[4].course_id, 5);

        let filtered = LimitFilter::new(20).apply(candidates, &profile).unwrap();
        assert_eq!(filtered.len(), 8);
    }
}
