//! Stable de-duplication by course id.
//!
//! The first occurrence wins and the list is not re-sorted, so a course
//! proposed by both the priority and the collaborative tier keeps its
//! priority position.

use crate::traits::Filter;
use anyhow::Result;
use catalog::CourseId;
use recommender::{Candidate, RatingProfile};
use std::collections::HashSet;

pub struct DeduplicateFilter;

impl Filter for DeduplicateFilter {
    fn name(&self) -> &str {
        "DeduplicateFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _profile: &RatingProfile,
    ) -> Result<Vec<Candidate>> {
        let mut seen: HashSet<CourseId> = HashSet::with_capacity(candidates.len());
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.course_id))
            .collect();
        Ok(filtered)
    }
}
