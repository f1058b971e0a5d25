//! Shared types for candidate generation.

use catalog::{CourseId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which tier produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    /// A course the user already rated highly
    Priority,
    /// Mean rating among peers who share rated courses
    Collaborative,
    /// Catalog-wide text similarity (cold start / fallback)
    Content,
}

/// A course proposed by one of the sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub course_id: CourseId,
    pub source: CandidateSource,
    /// Source-specific score: the user's own rating, the peer mean rating, or
    /// the aggregate text similarity
    pub base_score: f64,
}

impl Candidate {
    pub fn new(course_id: CourseId, source: CandidateSource, base_score: f64) -> Self {
        Self {
            course_id,
            source,
            base_score,
        }
    }
}

/// Rating values that split a user's history into bad and high buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingThresholds {
    /// Ratings at or below this are "bad" and excluded from results
    pub bad_max: u8,
    /// Ratings at or above this are "high" and ranked first
    pub high_min: u8,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            bad_max: 2,
            high_min: 4,
        }
    }
}

impl RatingThresholds {
    /// Configure the bad-rating ceiling (default: 2)
    pub fn with_bad_threshold(mut self, bad_max: u8) -> Self {
        self.bad_max = bad_max;
        self
    }

    /// Configure the high-rating floor (default: 4)
    pub fn with_high_threshold(mut self, high_min: u8) -> Self {
        self.high_min = high_min;
        self
    }
}

/// Everything the sources and filters need to know about one user's ratings
#[derive(Debug, Clone, Default)]
pub struct RatingProfile {
    pub user_id: UserId,
    /// The user's rating per course
    pub ratings: HashMap<CourseId, u8>,
    /// Courses rated at or below the bad threshold
    pub bad_rated: HashSet<CourseId>,
    /// Courses rated at or above the high threshold, in rating order
    pub high_rated: Vec<CourseId>,
}

impl RatingProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// No rating history at all
    pub fn is_cold_start(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn has_rated(&self, course_id: CourseId) -> bool {
        self.ratings.contains_key(&course_id)
    }

    pub fn is_bad_rated(&self, course_id: CourseId) -> bool {
        self.bad_rated.contains(&course_id)
    }

    pub fn is_high_rated(&self, course_id: CourseId) -> bool {
        self.high_rated.contains(&course_id)
    }
}
