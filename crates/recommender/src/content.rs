//! Content tier - catalog-wide text similarity ranking
//!
//! Each course becomes the document `title + " " + syllabus`. Courses are
//! scored by the sum of their TF-IDF cosine similarity to every other course
//! and the top `limit` are returned. This is not personalised: it ranks
//! courses that are "generally similar to everything" and only serves as the
//! cold-start and last-resort fallback.

use crate::tfidf::TfIdfModel;
use crate::types::{Candidate, CandidateSource};
use catalog::Course;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct ContentSource {
    limit: usize,
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSource {
    pub fn new() -> Self {
        Self { limit: 5 }
    }

    /// Configure how many courses to return (default: 5)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Rank `courses` by aggregate similarity, highest first.
    ///
    /// Deterministic for a fixed catalog: equal scores keep catalog order.
    #[instrument(skip(self, courses), fields(catalog_size = courses.len()))]
    pub fn rank(&self, courses: &[Course]) -> Vec<Candidate> {
        if courses.is_empty() {
            return Vec::new();
        }

        let documents: Vec<String> = courses.iter().map(Course::document).collect();
        let model = TfIdfModel::fit(&documents);
        let scores = model.aggregate_scores();
        debug!(
            "Fitted TF-IDF over {} courses ({} terms)",
            courses.len(),
            model.vocabulary_size()
        );

        let mut candidates: Vec<Candidate> = courses
            .iter()
            .zip(scores)
            .map(|(course, score)| Candidate::new(course.id, CandidateSource::Content, score))
            .collect();

        candidates.sort_by(|a, b| {
            b.base_score
                .partial_cmp(&a.base_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.limit);
        candidates
    }

    /// Same as [`rank`](Self::rank) but returns the courses themselves
    pub fn rank_courses(&self, courses: &[Course]) -> Vec<Course> {
        let ranked = self.rank(courses);
        ranked
            .iter()
            .filter_map(|c| courses.iter().find(|course| course.id == c.course_id))
            .cloned()
            .collect()
    }
}
