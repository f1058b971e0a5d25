//! Collaborative tier - user-based filtering by shared rated courses
//!
//! "People who rated what you rated also rated these well"
//!
//! ## Algorithm
//! 1. Peers = every other user who rated at least one course the target user
//!    rated (any rating value counts as an interaction)
//! 2. Collect every rating those peers made
//! 3. Group by course and take the mean rating
//! 4. Sort by mean rating, highest first, and keep the top `limit`
//!
//! The result is not filtered against the user's own history here; bad-rated
//! exclusion happens downstream in the filter pipeline.

use crate::types::{Candidate, CandidateSource, RatingProfile};
use catalog::{CourseId, Rating, UserId};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// Collaborative source over the full rating log
#[derive(Debug, Clone)]
pub struct CollaborativeSource {
    limit: usize,
}

impl Default for CollaborativeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CollaborativeSource {
    pub fn new() -> Self {
        Self { limit: 5 }
    }

    /// Configure how many peer-rated courses to keep (default: 5)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Generate collaborative candidates for a user.
    ///
    /// Returns an empty list for a cold-start profile.
    #[instrument(skip(self, profile, all_ratings), fields(user_id = profile.user_id))]
    pub fn get_candidates(&self, profile: &RatingProfile, all_ratings: &[Rating]) -> Vec<Candidate> {
        if profile.is_cold_start() {
            return Vec::new();
        }

        let peers = self.find_peers(profile, all_ratings);
        debug!("Found {} peers", peers.len());

        let means = self.mean_peer_ratings(&peers, all_ratings);

        // BTreeMap iteration is by course id, so ties stay in id order
        // through the stable sort below.
        let mut candidates: Vec<Candidate> = means
            .into_iter()
            .map(|(course_id, mean)| Candidate::new(course_id, CandidateSource::Collaborative, mean))
            .collect();

        candidates.sort_by(|a, b| {
            b.base_score
                .partial_cmp(&a.base_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.limit);

        debug!("Generated {} collaborative candidates", candidates.len());
        candidates
    }

    /// Other users who rated any course the target user rated
    fn find_peers(&self, profile: &RatingProfile, all_ratings: &[Rating]) -> HashSet<UserId> {
        all_ratings
            .par_iter()
            .filter(|r| r.user_id != profile.user_id && profile.has_rated(r.course_id))
            .map(|r| r.user_id)
            .collect()
    }

    /// Mean rating per course over every rating made by a peer
    fn mean_peer_ratings(
        &self,
        peers: &HashSet<UserId>,
        all_ratings: &[Rating],
    ) -> BTreeMap<CourseId, f64> {
        let sums = all_ratings
            .par_iter()
            .filter(|r| peers.contains(&r.user_id))
            .fold(BTreeMap::new, |mut local: BTreeMap<CourseId, (u32, u32)>, r| {
                let entry = local.entry(r.course_id).or_insert((0, 0));
                entry.0 += r.rating as u32;
                entry.1 += 1;
                local
            })
            .reduce(BTreeMap::new, |mut acc, local| {
                for (course_id, (sum, count)) in local {
                    let entry = acc.entry(course_id).or_insert((0, 0));
                    entry.0 += sum;
                    entry.1 += count;
                }
                acc
            });

        sums.into_iter()
            .map(|(course_id, (sum, count))| (course_id, sum as f64 / count as f64))
            .collect()
    }
}
