//! Filter to remove courses the user rated poorly.
//!
//! A course rated at or below the bad threshold must never be recommended,
//! whichever source proposed it.

use crate::traits::Filter;
use anyhow::Result;
use recommender::{Candidate, RatingProfile};

/// Removes candidates found in `RatingProfile::bad_rated`.
pub struct BadRatedFilter;

impl Filter for BadRatedFilter {
    fn name(&self) -> &str {
        "BadRatedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        profile: &RatingProfile,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !profile.is_bad_rated(candidate.course_id))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommender::CandidateSource;

    #[test]
    fn test_bad_rated_filter() {
        let mut profile = RatingProfile::new(1);
        profile.bad_rated.insert(100);
        profile.bad_rated.insert(200);

        let candidates = vec![
            Candidate::new(100, CandidateSource::Collaborative, 4.0),
            Candidate::new(101, CandidateSource::Collaborative, 3.5),
            Candidate::new(200, CandidateSource::Priority, 5.0),
            Candidate::new(300, CandidateSource::Content, 0.2),
        ];

        let filtered = BadRatedFilter.apply(candidates, &profile).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].course_id, 101);
        assert_eq!(filtered[1].course_id, 300);
    }
}
