//! Build a RatingProfile from raw ratings.
//!
//! The profile is gathered once per request so the sources and filters can do
//! O(1) lookups instead of rescanning the rating list.

use crate::types::{RatingProfile, RatingThresholds};
use catalog::{Rating, UserId};

/// Build the profile of `user_id` from a rating list.
///
/// `ratings` may contain every user's ratings; only the ones belonging to
/// `user_id` are used. A user without ratings yields an empty (cold-start)
/// profile rather than an error.
pub fn build_rating_profile(
    user_id: UserId,
    ratings: &[Rating],
    thresholds: RatingThresholds,
) -> RatingProfile {
    let mut profile = RatingProfile::new(user_id);

    for rating in ratings.iter().filter(|r| r.user_id == user_id) {
        // A store should hold one row per (user, course); if it doesn't, the
        // last one wins, the same as an upsert would have left it.
        if let Some(previous) = profile.ratings.insert(rating.course_id, rating.rating) {
            if previous <= thresholds.bad_max {
                profile.bad_rated.remove(&rating.course_id);
            }
            if previous >= thresholds.high_min {
                profile.high_rated.retain(|&id| id != rating.course_id);
            }
        }

        if rating.rating <= thresholds.bad_max {
            profile.bad_rated.insert(rating.course_id);
        }
        if rating.rating >= thresholds.high_min {
            profile.high_rated.push(rating.course_id);
        }
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings() -> Vec<Rating> {
        vec![
            Rating::new(1, 10, 5),
            Rating::new(1, 11, 1),
            Rating::new(1, 12, 3),
            Rating::new(1, 13, 4),
            Rating::new(1, 14, 2),
            Rating::new(2, 15, 5),
        ]
    }

    #[test]
    fn test_partition_bad_and_high() {
        let profile = build_rating_profile(1, &ratings(), RatingThresholds::default());

        assert_eq!(profile.ratings.len(), 5);
        assert_eq!(profile.high_rated, vec![10, 13]);
        assert!(profile.is_bad_rated(11));
        assert!(profile.is_bad_rated(14));
        assert_eq!(profile.bad_rated.len(), 2);
        // Neutral rating is neither bad nor high
        assert!(profile.has_rated(12));
        assert!(!profile.is_bad_rated(12));
        assert!(!profile.is_high_rated(12));
        // Other users' ratings are ignored
        assert!(!profile.has_rated(15));
    }

    #[test]
    fn test_cold_start() {
        let profile = build_rating_profile(99, &ratings(), RatingThresholds::default());
        assert!(profile.is_cold_start());
        assert!(profile.high_rated.is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RatingThresholds::default()
            .with_bad_threshold(3)
            .with_high_threshold(5);
        let profile = build_rating_profile(1, &ratings(), thresholds);

        assert_eq!(profile.high_rated, vec![10]);
        assert!(profile.is_bad_rated(12));
    }

    #[test]
    fn test_repeated_rating_last_wins() {
        let ratings = vec![Rating::new(1, 10, 1), Rating::new(1, 10, 5)];
        let profile = build_rating_profile(1, &ratings, RatingThresholds::default());

        assert!(!profile.is_bad_rated(10));
        assert_eq!(profile.high_rated, vec![10]);
        assert_eq!(profile.ratings[&10], 5);
    }
}
