//! # Course Service
//!
//! Marketplace operations over a shared `CatalogIndex`: accounts, course
//! CRUD and search, ratings, enrollment and progress, recommendations.
//!
//! The index sits behind a `tokio::sync::RwLock`. Recommendation requests
//! copy the rows they need under a read lock and run the engine on the
//! blocking pool, so long text-similarity computations never hold the lock.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use recommender::CandidateSource;

use catalog::{
    CatalogIndex, CatalogStore, Category, Course, CourseId, CourseStats, Rating, User, UserId,
    MAX_RATING, MIN_RATING,
};

use crate::engine::HybridRecommender;
use crate::error::{ServiceError, ServiceResult};
use crate::evaluation::{precision_at_k, Evaluation};

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Titles of the courses the user is enrolled in
    pub enrolled_courses: Vec<String>,
}

/// Fields for creating or replacing a course
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub syllabus: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl NewCourse {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn into_course(self, id: CourseId) -> Course {
        let mut course = Course::new(id, self.title);
        course.description = self.description;
        course.syllabus = self.syllabus;
        course.category = self.category;
        if let Some(instructor) = self.instructor {
            course.instructor = instructor;
        }
        course.price = self.price;
        course.duration = self.duration;
        course.resources = self.resources;
        course
    }
}

/// Course listing filters
#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Minimum average rating; unrated courses never match
    pub min_rating: Option<f32>,
}

/// A course with its rating statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    #[serde(flatten)]
    pub stats: CourseStats,
}

/// A rating that carries written feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackEntry {
    pub user_id: UserId,
    pub username: String,
    pub rating: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
}

/// A recommended course and the tier that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedCourse {
    pub course: Course,
    pub source: CandidateSource,
    /// The user's own rating, the peer mean rating, or the text-similarity score
    pub score: f64,
}

/// Raw catalog and rating dump for offline analysis
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationData {
    pub courses: Vec<Course>,
    pub ratings: Vec<Rating>,
}

/// Async facade over the catalog and the recommendation engine
#[derive(Clone)]
pub struct CourseService {
    index: Arc<RwLock<CatalogIndex>>,
    engine: Arc<HybridRecommender>,
}

impl CourseService {
    pub fn new(index: CatalogIndex) -> Self {
        Self::with_engine(index, HybridRecommender::new())
    }

    pub fn with_engine(index: CatalogIndex, engine: HybridRecommender) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            engine: Arc::new(engine),
        }
    }

    /// Load a data directory and wrap it in a service
    pub fn load(data_dir: &Path) -> ServiceResult<Self> {
        let index = CatalogIndex::load_from_dir(data_dir)?;
        Ok(Self::new(index))
    }

    /// Persist the current state to a data directory
    pub async fn save(&self, data_dir: &Path) -> ServiceResult<()> {
        let index = self.index.read().await;
        index.save_to_dir(data_dir)?;
        info!("Saved catalog to {}", data_dir.display());
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub async fn register_user(&self, username: &str, email: &str) -> ServiceResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::InvalidInput("username must not be empty".to_string()));
        }
        let email = email.trim();
        storable(catalog::check_field("username", username))?;
        storable(catalog::check_field("email", email))?;

        let mut index = self.index.write().await;
        if index.get_user_by_username(username).is_some() {
            return Err(ServiceError::InvalidInput(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: index.next_user_id()?,
            username: username.to_string(),
            email: email.to_string(),
        };
        index.insert_user(user.clone());
        info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub async fn find_user(&self, username: &str) -> ServiceResult<User> {
        let index = self.index.read().await;
        index
            .get_user_by_username(username)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("user '{}'", username)))
    }

    pub async fn user_profile(&self, user_id: UserId) -> ServiceResult<UserProfile> {
        let index = self.index.read().await;
        let user = index
            .get_user(user_id)
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))?;

        let enrolled_courses = index
            .get_user_enrollments(user_id)
            .into_iter()
            .filter_map(|e| index.get_course(e.course_id))
            .map(|c| c.title.clone())
            .collect();

        Ok(UserProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            enrolled_courses,
        })
    }

    /// Partial update: `None` keeps the current value
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<User> {
        let mut index = self.index.write().await;
        let mut user = index
            .get_user(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))?;

        if let Some(username) = username {
            let username = username.trim();
            if username.is_empty() {
                return Err(ServiceError::InvalidInput("username must not be empty".to_string()));
            }
            storable(catalog::check_field("username", username))?;
            let taken = index
                .get_user_by_username(username)
                .is_some_and(|other| other.id != user_id);
            if taken {
                return Err(ServiceError::InvalidInput(format!(
                    "username '{}' is already taken",
                    username
                )));
            }
            user.username = username.to_string();
        }
        if let Some(email) = email {
            let email = email.trim();
            storable(catalog::check_field("email", email))?;
            user.email = email.to_string();
        }

        index.insert_user(user.clone());
        Ok(user)
    }

    // =========================================================================
    // Courses
    // =========================================================================

    pub async fn create_course(&self, new_course: NewCourse) -> ServiceResult<Course> {
        validate_course(&new_course)?;
        let mut index = self.index.write().await;
        let course = new_course.into_course(index.next_course_id()?);
        index.insert_course(course.clone());
        info!("Created course {} '{}'", course.id, course.title);
        Ok(course)
    }

    pub async fn get_course(&self, course_id: CourseId) -> ServiceResult<Course> {
        let index = self.index.read().await;
        index
            .get_course(course_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("course {}", course_id)))
    }

    /// Replace every field of an existing course
    pub async fn update_course(&self, course_id: CourseId, update: NewCourse) -> ServiceResult<Course> {
        validate_course(&update)?;
        let mut index = self.index.write().await;
        if index.get_course(course_id).is_none() {
            return Err(ServiceError::NotFound(format!("course {}", course_id)));
        }
        let course = update.into_course(course_id);
        index.insert_course(course.clone());
        Ok(course)
    }

    /// Delete a course with its ratings and enrollments
    pub async fn delete_course(&self, course_id: CourseId) -> ServiceResult<Course> {
        let mut index = self.index.write().await;
        let course = index.remove_course(course_id)?;
        info!("Deleted course {} '{}'", course.id, course.title);
        Ok(course)
    }

    pub async fn list_courses(&self, query: &CourseQuery) -> Vec<CourseSummary> {
        let index = self.index.read().await;
        let stats = index.compute_course_stats();
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        index
            .courses()
            .filter(|course| match &needle {
                Some(needle) => course.title.to_lowercase().contains(needle),
                None => true,
            })
            .map(|course| CourseSummary {
                course: course.clone(),
                stats: stats.get(&course.id).copied().unwrap_or_default(),
            })
            .filter(|summary| match query.min_rating {
                Some(min) => summary.stats.avg_rating.is_some_and(|avg| avg >= min),
                None => true,
            })
            .collect()
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Create or overwrite the user's rating for a course.
    ///
    /// Blank feedback is stored as `None`.
    #[instrument(skip(self, feedback))]
    pub async fn rate_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
        rating: u8,
        feedback: Option<&str>,
    ) -> ServiceResult<Rating> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ServiceError::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        let mut record = Rating::new(user_id, course_id, rating);
        if let Some(feedback) = feedback {
            record = record.with_feedback(feedback);
        }

        let mut index = self.index.write().await;
        let previous = index.upsert_rating(record.clone())?;
        debug!(
            "Stored rating {} (previous: {:?})",
            rating,
            previous.map(|r| r.rating)
        );
        Ok(record)
    }

    /// Ratings for a course that carry written feedback, ordered by user id
    pub async fn course_feedback(&self, course_id: CourseId) -> ServiceResult<Vec<FeedbackEntry>> {
        let index = self.index.read().await;
        if index.get_course(course_id).is_none() {
            return Err(ServiceError::NotFound(format!("course {}", course_id)));
        }

        let entries = index
            .get_course_ratings(course_id)
            .into_iter()
            .filter_map(|r| {
                let feedback = r.feedback.as_ref()?;
                let username = index
                    .get_user(r.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                Some(FeedbackEntry {
                    user_id: r.user_id,
                    username,
                    rating: r.rating,
                    feedback: feedback.clone(),
                })
            })
            .collect();
        Ok(entries)
    }

    // =========================================================================
    // Enrollment & progress
    // =========================================================================

    pub async fn enroll(&self, user_id: UserId, course_id: CourseId) -> ServiceResult<EnrollOutcome> {
        let mut index = self.index.write().await;
        let created = index.enroll(user_id, course_id, now())?;
        if created {
            info!("User {} enrolled in course {}", user_id, course_id);
            Ok(EnrollOutcome::Enrolled)
        } else {
            Ok(EnrollOutcome::AlreadyEnrolled)
        }
    }

    /// Completed topics; empty when the user is not enrolled
    pub async fn progress(&self, user_id: UserId, course_id: CourseId) -> ServiceResult<Vec<String>> {
        let index = self.index.read().await;
        if index.get_user(user_id).is_none() {
            return Err(ServiceError::NotFound(format!("user {}", user_id)));
        }
        if index.get_course(course_id).is_none() {
            return Err(ServiceError::NotFound(format!("course {}", course_id)));
        }
        Ok(index
            .get_enrollment(user_id, course_id)
            .map(|e| e.completed_topics.clone())
            .unwrap_or_default())
    }

    /// Replace the completed topics, enrolling the user first if needed
    pub async fn update_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_topics: Vec<String>,
    ) -> ServiceResult<Vec<String>> {
        let topics: Vec<String> = completed_topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        for topic in &topics {
            storable(catalog::check_topic(topic))?;
        }

        let mut index = self.index.write().await;
        let enrollment = index.set_completed_topics(user_id, course_id, topics, now())?;
        debug!(
            "User {} completed {} topics of course {}",
            user_id,
            enrollment.completed_topics.len(),
            course_id
        );
        Ok(enrollment.completed_topics.clone())
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    pub async fn recommend(&self, user_id: UserId) -> ServiceResult<Vec<Course>> {
        let recommendations = self.recommend_detailed(user_id).await?;
        Ok(recommendations.into_iter().map(|r| r.course).collect())
    }

    /// Recommendations together with the tier and score behind each one
    pub async fn recommend_detailed(&self, user_id: UserId) -> ServiceResult<Vec<RecommendedCourse>> {
        let start_time = Instant::now();

        let (courses, ratings) = {
            let index = self.index.read().await;
            if index.get_user(user_id).is_none() {
                return Err(ServiceError::NotFound(format!("user {}", user_id)));
            }
            (index.fetch_all_courses(), index.fetch_all_ratings())
        };

        let engine = self.engine.clone();
        let recommendations = tokio::task::spawn_blocking(move || {
            let candidates = engine.recommend_candidates(user_id, &courses, &ratings);
            let by_id: HashMap<CourseId, Course> =
                courses.into_iter().map(|c| (c.id, c)).collect();
            candidates
                .into_iter()
                .filter_map(|candidate| {
                    let course = by_id.get(&candidate.course_id)?.clone();
                    Some(RecommendedCourse {
                        course,
                        source: candidate.source,
                        score: candidate.base_score,
                    })
                })
                .collect::<Vec<_>>()
        })
        .await?;

        info!(
            "Served {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    pub async fn recommendation_data(&self) -> RecommendationData {
        let index = self.index.read().await;
        RecommendationData {
            courses: index.fetch_all_courses(),
            ratings: index.fetch_all_ratings(),
        }
    }

    /// Precision@K of the user's recommendations against the courses they rated
    pub async fn evaluate(&self, user_id: UserId, k: usize) -> ServiceResult<Evaluation> {
        let relevant: HashSet<CourseId> = {
            let index = self.index.read().await;
            index
                .fetch_ratings_for_user(user_id)
                .iter()
                .map(|r| r.course_id)
                .collect()
        };

        let recommended: Vec<CourseId> = self
            .recommend(user_id)
            .await?
            .iter()
            .map(|c| c.id)
            .collect();
        let precision = precision_at_k(&recommended, &relevant, k);

        let mut relevant: Vec<CourseId> = relevant.into_iter().collect();
        relevant.sort_unstable();
        Ok(Evaluation {
            k,
            recommended,
            relevant,
            precision,
        })
    }

    /// (users, courses, ratings, enrollments)
    pub async fn counts(&self) -> (usize, usize, usize, usize) {
        self.index.read().await.counts()
    }
}

fn validate_course(course: &NewCourse) -> ServiceResult<()> {
    if course.title.trim().is_empty() {
        return Err(ServiceError::InvalidInput("course title must not be empty".to_string()));
    }
    if !course.price.is_finite() || course.price < 0.0 {
        return Err(ServiceError::InvalidInput(format!("invalid price {}", course.price)));
    }
    Ok(())
}

/// Values that cannot be persisted are rejected as bad input
fn storable(check: catalog::Result<()>) -> ServiceResult<()> {
    check.map_err(|e| ServiceError::InvalidInput(e.to_string()))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
