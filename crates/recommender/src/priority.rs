//! Priority tier: the user's own highly rated courses.

use crate::types::{Candidate, CandidateSource, RatingProfile};
use catalog::Course;
use tracing::{debug, instrument};

/// Surfaces high-rated courses that are still in the candidate pool, in the
/// pool's (catalog) order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrioritySource;

impl PrioritySource {
    #[instrument(skip(self, profile, pool), fields(user_id = profile.user_id))]
    pub fn get_candidates(&self, profile: &RatingProfile, pool: &[&Course]) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = pool
            .iter()
            .filter(|course| profile.is_high_rated(course.id))
            .map(|course| {
                let rating = profile.ratings.get(&course.id).copied().unwrap_or_default();
                Candidate::new(course.id, CandidateSource::Priority, rating as f64)
            })
            .collect();

        debug!("Generated {} priority candidates", candidates.len());
        candidates
    }
}
