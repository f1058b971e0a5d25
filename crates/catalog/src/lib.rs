//! # Catalog Crate
//!
//! Storage layer for the course marketplace: courses, users, ratings and
//! enrollments held in an in-memory `CatalogIndex`, loaded from and saved to a
//! data directory.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Course, User, Rating, Enrollment, CatalogIndex)
//! - **parser**: Parse `.dat` / `courses.json` files into Rust structs
//! - **index**: Load, validate and aggregate the catalog
//! - **writer**: Persist the catalog back to disk
//! - **store**: `CatalogStore`, the read interface the recommender consumes
//! - **error**: Error types for catalog operations
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, CatalogStore, Rating};
//! use std::path::Path;
//!
//! let mut index = CatalogIndex::load_from_dir(Path::new("data/catalog"))?;
//! index.upsert_rating(Rating::new(1, 3, 5).with_feedback("Great pacing"))?;
//! let courses = index.fetch_all_courses();
//! index.save_to_dir(Path::new("data/catalog"))?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod writer;
pub mod store;

pub use error::{CatalogError, Result};
pub use parser::parse_resource_list;
pub use store::CatalogStore;
pub use writer::{check_field, check_topic};
pub use types::{
    // Type aliases
    CourseId,
    UserId,
    // Core types
    CatalogIndex,
    Category,
    Course,
    CourseStats,
    Enrollment,
    Rating,
    User,
    MAX_RATING,
    MIN_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId) -> User {
        User {
            id,
            username: format!("learner{}", id),
            email: format!("learner{}@example.com", id),
        }
    }

    #[test]
    fn test_catalog_index_creation() {
        let index = CatalogIndex::new();
        assert_eq!(index.counts(), (0, 0, 0, 0));
        assert_eq!(index.next_user_id().unwrap(), 1);
        assert_eq!(index.next_course_id().unwrap(), 1);
    }

    #[test]
    fn test_next_id_exhausted() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(UserId::MAX));
        index.insert_course(Course::new(CourseId::MAX, "Last Course"));

        assert!(matches!(
            index.next_user_id(),
            Err(CatalogError::ValidationError(_))
        ));
        assert!(matches!(
            index.next_course_id(),
            Err(CatalogError::ValidationError(_))
        ));
    }

    #[test]
    fn test_upsert_rating_overwrites() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(1));
        index.insert_course(Course::new(7, "Intro to Design"));

        let previous = index.upsert_rating(Rating::new(1, 7, 2)).unwrap();
        assert!(previous.is_none());

        let previous = index
            .upsert_rating(Rating::new(1, 7, 5).with_feedback("Changed my mind"))
            .unwrap();
        assert_eq!(previous.map(|r| r.rating), Some(2));

        let ratings = index.get_user_ratings(1);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 5);
        assert_eq!(index.counts().2, 1);
    }

    #[test]
    fn test_upsert_rating_rejects_out_of_range() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(1));
        index.insert_course(Course::new(1, "Rust"));

        assert!(matches!(
            index.upsert_rating(Rating::new(1, 1, 0)),
            Err(CatalogError::InvalidValue { .. })
        ));
        assert!(index.upsert_rating(Rating::new(1, 1, 6)).is_err());
        assert!(matches!(
            index.upsert_rating(Rating::new(1, 2, 3)),
            Err(CatalogError::MissingReference { id: 2, .. })
        ));
    }

    #[test]
    fn test_enroll_once() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(1));
        index.insert_course(Course::new(1, "Rust"));

        assert!(index.enroll(1, 1, 100).unwrap());
        assert!(!index.enroll(1, 1, 200).unwrap());
        assert_eq!(index.get_enrollment(1, 1).map(|e| e.enrolled_at), Some(100));
    }

    #[test]
    fn test_remove_course_cascades() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(1));
        index.insert_course(Course::new(1, "Rust"));
        index.insert_course(Course::new(2, "Go"));
        index.upsert_rating(Rating::new(1, 1, 4)).unwrap();
        index.upsert_rating(Rating::new(1, 2, 4)).unwrap();
        index.enroll(1, 1, 0).unwrap();

        let removed = index.remove_course(1).unwrap();
        assert_eq!(removed.title, "Rust");
        assert_eq!(index.counts(), (1, 1, 1, 0));
        assert!(index.remove_course(1).is_err());
    }

    #[test]
    fn test_store_reads() {
        let mut index = CatalogIndex::new();
        index.insert_user(user(1));
        index.insert_user(user(2));
        index.insert_course(Course::new(2, "B"));
        index.insert_course(Course::new(1, "A"));
        index.upsert_rating(Rating::new(1, 1, 4)).unwrap();
        index.upsert_rating(Rating::new(2, 2, 3)).unwrap();

        let ids: Vec<CourseId> = index.fetch_all_courses().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(index.fetch_ratings_for_user(2).len(), 1);
        assert_eq!(index.fetch_all_ratings().len(), 2);
    }

    #[test]
    fn test_course_document() {
        let course = Course::new(1, "Rust").with_syllabus("ownership");
        assert_eq!(course.document(), "Rust ownership");
        assert_eq!(Course::new(2, "Go").document(), "Go ");
    }
}
