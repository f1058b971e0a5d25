//! Server crate for the course marketplace.
//!
//! This crate contains the hybrid recommendation engine that coordinates the
//! candidate sources and filters, and the async `CourseService` that exposes
//! the marketplace operations over a shared catalog.

pub mod engine;
pub mod error;
pub mod evaluation;
pub mod service;

pub use engine::{HybridRecommender, DEFAULT_LIMIT};
pub use error::{ServiceError, ServiceResult};
pub use evaluation::{precision_at_k, Evaluation};
pub use service::{
    CourseQuery, CourseService, CourseSummary, EnrollOutcome, FeedbackEntry, NewCourse,
    RecommendationData, RecommendedCourse, UserProfile,
};
