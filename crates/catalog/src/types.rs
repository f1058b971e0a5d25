//! Core domain types for the course marketplace.
//!
//! Courses, users, ratings and enrollments, plus the `CatalogIndex` that owns
//! them in memory. Ratings and enrollments are keyed on the composite
//! `(UserId, CourseId)` pair so each pair can only ever hold one row.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a registered user
pub type UserId = u32;

/// Unique identifier for a course
pub type CourseId = u32;

/// Lowest accepted rating value
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating value
pub const MAX_RATING: u8 = 5;

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Courses
// =============================================================================

/// Course categories offered by the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Programming,
    #[serde(rename = "Data Science")]
    DataScience,
    Design,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Programming => "Programming",
            Category::DataScience => "Data Science",
            Category::Design => "Design",
        };
        f.write_str(label)
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "programming" => Ok(Category::Programming),
            "data science" | "data-science" | "datascience" => Ok(Category::DataScience),
            "design" => Ok(Category::Design),
            _ => Err(CatalogError::InvalidValue {
                field: "category".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

fn default_instructor() -> String {
    "Unknown Instructor".to_string()
}

/// A course in the catalog.
///
/// The recommender treats courses as read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-text syllabus; used together with the title for text similarity
    #[serde(default)]
    pub syllabus: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_instructor")]
    pub instructor: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration: Option<String>,
    /// Ordered resource links
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Course {
    /// Minimal course with defaults for every optional field.
    pub fn new(id: CourseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            syllabus: None,
            category: Category::default(),
            instructor: default_instructor(),
            price: 0.0,
            duration: None,
            resources: Vec::new(),
        }
    }

    pub fn with_syllabus(mut self, syllabus: impl Into<String>) -> Self {
        self.syllabus = Some(syllabus.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Text document used for content similarity: `title + " " + syllabus`.
    pub fn document(&self) -> String {
        format!("{} {}", self.title, self.syllabus.as_deref().unwrap_or(""))
    }
}

// =============================================================================
// Ratings & Enrollments
// =============================================================================

/// A user's rating (and optional written feedback) for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Integer rating from 1 to 5
    pub rating: u8,
    pub feedback: Option<String>,
}

impl Rating {
    pub fn new(user_id: UserId, course_id: CourseId, rating: u8) -> Self {
        Self {
            user_id,
            course_id,
            rating,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        let feedback = feedback.into();
        let trimmed = feedback.trim();
        self.feedback = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Check the rating value lies in `MIN_RATING..=MAX_RATING`.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::InvalidValue {
                field: "rating".to_string(),
                value: self.rating.to_string(),
            });
        }
        Ok(())
    }
}

/// A user's enrollment in a course along with their progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Unix timestamp (seconds) of enrollment
    pub enrolled_at: i64,
    pub completed_topics: Vec<String>,
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate rating statistics for a course
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseStats {
    /// `None` when nobody has rated the course yet
    pub avg_rating: Option<f32>,
    pub rating_count: u32,
}

// =============================================================================
// CatalogIndex
// =============================================================================

fn next_id(entity: &str, highest: Option<u32>) -> Result<u32> {
    match highest {
        None => Ok(1),
        Some(id) => id.checked_add(1).ok_or_else(|| {
            CatalogError::ValidationError(format!("{} ids exhausted at {}", entity, id))
        }),
    }
}

/// In-memory catalog and interaction store.
///
/// Courses iterate in ascending id order, which is the catalog iteration
/// order the recommender relies on.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) courses: BTreeMap<CourseId, Course>,
    /// One rating per (user, course)
    pub(crate) ratings: BTreeMap<(UserId, CourseId), Rating>,
    /// One enrollment per (user, course)
    pub(crate) enrollments: BTreeMap<(UserId, CourseId), Enrollment>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // Getters

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn get_course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    /// All courses in catalog order
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// All users sorted by id
    pub fn users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    /// All ratings, ordered by (user, course)
    pub fn ratings(&self) -> impl Iterator<Item = &Rating> {
        self.ratings.values()
    }

    pub fn get_rating(&self, user_id: UserId, course_id: CourseId) -> Option<&Rating> {
        self.ratings.get(&(user_id, course_id))
    }

    /// Ratings made by a user, ordered by course id
    pub fn get_user_ratings(&self, user_id: UserId) -> Vec<&Rating> {
        self.ratings
            .range((user_id, CourseId::MIN)..=(user_id, CourseId::MAX))
            .map(|(_, r)| r)
            .collect()
    }

    /// Ratings received by a course, ordered by user id
    pub fn get_course_ratings(&self, course_id: CourseId) -> Vec<&Rating> {
        self.ratings
            .values()
            .filter(|r| r.course_id == course_id)
            .collect()
    }

    pub fn get_enrollment(&self, user_id: UserId, course_id: CourseId) -> Option<&Enrollment> {
        self.enrollments.get(&(user_id, course_id))
    }

    pub fn get_user_enrollments(&self, user_id: UserId) -> Vec<&Enrollment> {
        self.enrollments
            .range((user_id, CourseId::MIN)..=(user_id, CourseId::MAX))
            .map(|(_, e)| e)
            .collect()
    }

    pub fn enrollments(&self) -> impl Iterator<Item = &Enrollment> {
        self.enrollments.values()
    }

    /// Id for the next registered user; fails once `UserId::MAX` is taken
    pub fn next_user_id(&self) -> Result<UserId> {
        next_id("User", self.users.keys().max().copied())
    }

    /// Id for the next created course; fails once `CourseId::MAX` is taken
    pub fn next_course_id(&self) -> Result<CourseId> {
        next_id("Course", self.courses.keys().next_back().copied())
    }

    // Mutators

    /// Insert or replace a user by id
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert or replace a course by id
    pub fn insert_course(&mut self, course: Course) {
        self.courses.insert(course.id, course);
    }

    /// Remove a course together with its ratings and enrollments
    pub fn remove_course(&mut self, course_id: CourseId) -> Result<Course> {
        let course = self
            .courses
            .remove(&course_id)
            .ok_or_else(|| CatalogError::not_found("Course", course_id))?;
        self.ratings.retain(|&(_, c), _| c != course_id);
        self.enrollments.retain(|&(_, c), _| c != course_id);
        Ok(course)
    }

    /// Insert or overwrite the rating for `(rating.user_id, rating.course_id)`.
    ///
    /// Returns the rating that was replaced, if any.
    pub fn upsert_rating(&mut self, rating: Rating) -> Result<Option<Rating>> {
        rating.validate()?;
        self.check_references(rating.user_id, rating.course_id)?;
        Ok(self
            .ratings
            .insert((rating.user_id, rating.course_id), rating))
    }

    /// Enroll a user in a course. Returns `false` if already enrolled.
    pub fn enroll(&mut self, user_id: UserId, course_id: CourseId, enrolled_at: i64) -> Result<bool> {
        self.check_references(user_id, course_id)?;
        let mut created = false;
        self.enrollments.entry((user_id, course_id)).or_insert_with(|| {
            created = true;
            Enrollment {
                user_id,
                course_id,
                enrolled_at,
                completed_topics: Vec::new(),
            }
        });
        Ok(created)
    }

    /// Replace the completed topics of an enrollment, enrolling first if needed
    pub fn set_completed_topics(
        &mut self,
        user_id: UserId,
        course_id: CourseId,
        topics: Vec<String>,
        enrolled_at: i64,
    ) -> Result<&Enrollment> {
        self.check_references(user_id, course_id)?;
        let enrollment = self
            .enrollments
            .entry((user_id, course_id))
            .or_insert_with(|| Enrollment {
                user_id,
                course_id,
                enrolled_at,
                completed_topics: Vec::new(),
            });
        enrollment.completed_topics = topics;
        Ok(enrollment)
    }

    pub(crate) fn insert_enrollment(&mut self, enrollment: Enrollment) {
        self.enrollments
            .insert((enrollment.user_id, enrollment.course_id), enrollment);
    }

    pub(crate) fn check_references(&self, user_id: UserId, course_id: CourseId) -> Result<()> {
        if !self.users.contains_key(&user_id) {
            return Err(CatalogError::MissingReference {
                entity: "User".to_string(),
                id: user_id,
            });
        }
        if !self.courses.contains_key(&course_id) {
            return Err(CatalogError::MissingReference {
                entity: "Course".to_string(),
                id: course_id,
            });
        }
        Ok(())
    }

    /// Get counts for debugging/validation: (users, courses, ratings, enrollments)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.users.len(),
            self.courses.len(),
            self.ratings.len(),
            self.enrollments.len(),
        )
    }
}
