//! CatalogIndex loading, statistics and validation.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

pub const COURSES_FILE: &str = "courses.json";
pub const USERS_FILE: &str = "users.dat";
pub const RATINGS_FILE: &str = "ratings.dat";
pub const ENROLLMENTS_FILE: &str = "enrollments.dat";

/// Treat a missing optional data file as empty
fn optional<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(CatalogError::FileNotFound { path }) => {
            debug!("{} not present, starting empty", path);
            Ok(Vec::new())
        }
        other => other,
    }
}

impl CatalogIndex {
    /// Load the catalog from a data directory.
    ///
    /// `courses.json` is required; users, ratings and enrollments default to
    /// empty when their files are absent. Files are parsed in parallel, then
    /// inserted and validated.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", data_dir);

        let courses_path = data_dir.join(COURSES_FILE);
        let users_path = data_dir.join(USERS_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);
        let enrollments_path = data_dir.join(ENROLLMENTS_FILE);

        let ((courses, users), (ratings, enrollments)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_courses(&courses_path),
                    || optional(parser::parse_users(&users_path)),
                )
            },
            || {
                rayon::join(
                    || optional(parser::parse_ratings(&ratings_path)),
                    || optional(parser::parse_enrollments(&enrollments_path)),
                )
            },
        );

        let courses = courses?;
        let users = users?;
        let ratings = ratings?;
        let enrollments = enrollments?;

        info!(
            "Parsed {} courses, {} users, {} ratings, {} enrollments",
            courses.len(),
            users.len(),
            ratings.len(),
            enrollments.len()
        );

        let mut index = CatalogIndex::new();

        for course in courses {
            if index.courses.contains_key(&course.id) {
                return Err(CatalogError::Duplicate {
                    entity: "Course".to_string(),
                    key: course.id.to_string(),
                });
            }
            index.insert_course(course);
        }

        for user in users {
            if index.users.contains_key(&user.id) {
                return Err(CatalogError::Duplicate {
                    entity: "User".to_string(),
                    key: user.id.to_string(),
                });
            }
            index.insert_user(user);
        }

        // Later lines for the same (user, course) overwrite earlier ones
        for rating in ratings {
            index.upsert_rating(rating)?;
        }

        for enrollment in enrollments {
            index.insert_enrollment(enrollment);
        }

        index.validate()?;

        info!("Catalog loaded and validated");
        Ok(index)
    }

    /// Rating statistics for one course
    pub fn get_course_stats(&self, course_id: CourseId) -> CourseStats {
        let ratings = self.get_course_ratings(course_id);
        stats_from(ratings.iter().map(|r| r.rating))
    }

    /// Rating statistics for every course in the catalog
    pub fn compute_course_stats(&self) -> HashMap<CourseId, CourseStats> {
        let mut sums: HashMap<CourseId, (u32, u32)> = HashMap::new();
        for rating in self.ratings.values() {
            let entry = sums.entry(rating.course_id).or_insert((0, 0));
            entry.0 += rating.rating as u32;
            entry.1 += 1;
        }

        self.courses
            .keys()
            .map(|&id| {
                let stats = match sums.get(&id) {
                    Some(&(total, count)) => CourseStats {
                        avg_rating: Some(total as f32 / count as f32),
                        rating_count: count,
                    },
                    None => CourseStats::default(),
                };
                (id, stats)
            })
            .collect()
    }

    /// Validate data integrity
    ///
    /// Checks that:
    /// - Usernames are unique
    /// - Ratings are in range and reference existing users/courses
    /// - Enrollments reference existing users/courses
    pub fn validate(&self) -> Result<()> {
        let mut usernames = HashSet::new();
        for user in self.users.values() {
            if !usernames.insert(user.username.as_str()) {
                return Err(CatalogError::Duplicate {
                    entity: "username".to_string(),
                    key: user.username.clone(),
                });
            }
        }

        for rating in self.ratings.values() {
            rating.validate()?;
            self.check_references(rating.user_id, rating.course_id)?;
        }

        for enrollment in self.enrollments.values() {
            self.check_references(enrollment.user_id, enrollment.course_id)?;
        }

        Ok(())
    }
}

fn stats_from(values: impl Iterator<Item = u8>) -> CourseStats {
    let (total, count) = values.fold((0u32, 0u32), |(t, c), v| (t + v as u32, c + 1));
    if count == 0 {
        return CourseStats::default();
    }
    CourseStats {
        avg_rating: Some(total as f32 / count as f32),
        rating_count: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        for id in 1..=2 {
            index.insert_user(User {
                id,
                username: format!("user{}", id),
                email: format!("user{}@example.com", id),
            });
        }
        index.insert_course(Course::new(1, "Rust Basics"));
        index.insert_course(Course::new(2, "Design Systems"));
        index
    }

    #[test]
    fn test_course_stats() {
        let mut index = seeded_index();
        index.upsert_rating(Rating::new(1, 1, 5)).unwrap();
        index.upsert_rating(Rating::new(2, 1, 2)).unwrap();

        let stats = index.compute_course_stats();
        assert_eq!(stats[&1].rating_count, 2);
        assert_eq!(stats[&1].avg_rating, Some(3.5));
        assert_eq!(stats[&2], CourseStats::default());
        assert_eq!(index.get_course_stats(1), stats[&1]);
    }

    #[test]
    fn test_validate_duplicate_username() {
        let mut index = seeded_index();
        index.insert_user(User {
            id: 3,
            username: "user1".to_string(),
            email: String::new(),
        });
        assert!(matches!(
            index.validate(),
            Err(CatalogError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_dangling_enrollment() {
        let mut index = seeded_index();
        index.insert_enrollment(Enrollment {
            user_id: 1,
            course_id: 99,
            enrolled_at: 0,
            completed_topics: vec![],
        });
        assert!(matches!(
            index.validate(),
            Err(CatalogError::MissingReference { id: 99, .. })
        ));
    }

    #[test]
    fn test_load_requires_courses_file() {
        let dir = std::env::temp_dir().join(format!("catalog-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = CatalogIndex::load_from_dir(&dir).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }
}
