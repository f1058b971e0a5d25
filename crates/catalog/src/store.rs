//! Read interface the recommender consumes.
//!
//! Any backing store (the in-memory `CatalogIndex`, a database adapter, a
//! test fixture) only needs these three reads.

use crate::types::{CatalogIndex, Course, Rating, UserId};

pub trait CatalogStore: Send + Sync {
    /// Every course, in catalog iteration order
    fn fetch_all_courses(&self) -> Vec<Course>;

    /// The ratings a single user has submitted
    fn fetch_ratings_for_user(&self, user_id: UserId) -> Vec<Rating>;

    /// Every rating from every user
    fn fetch_all_ratings(&self) -> Vec<Rating>;
}

impl CatalogStore for CatalogIndex {
    fn fetch_all_courses(&self) -> Vec<Course> {
        self.courses().cloned().collect()
    }

    fn fetch_ratings_for_user(&self, user_id: UserId) -> Vec<Rating> {
        self.get_user_ratings(user_id).into_iter().cloned().collect()
    }

    fn fetch_all_ratings(&self) -> Vec<Rating> {
        self.ratings().cloned().collect()
    }
}
