//! # Hybrid Recommender
//!
//! Combines the candidate sources into the final course list:
//! 1. Build the user's rating profile
//! 2. No ratings: content ranking over the full catalog (cold start)
//! 3. Candidate pool = catalog minus bad-rated courses (empty pool, empty result)
//! 4. Tier 1: high-rated courses still in the pool, catalog order
//! 5. Tier 2: peer mean ratings, top 5, unknown courses dropped
//! 6. Concatenate, then BadRated -> Deduplicate -> Limit
//! 7. Nothing left: content ranking fallback
//!
//! The engine is a pure function of the catalog and the rating table. It
//! never fails; every stage degrades to a smaller (possibly empty) list.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use catalog::{CatalogStore, Course, CourseId, Rating, UserId};
use pipeline::filters::{BadRatedFilter, DeduplicateFilter, LimitFilter};
use pipeline::FilterPipeline;
use recommender::{
    build_rating_profile, Candidate, CollaborativeSource, ContentSource, PrioritySource,
    RatingProfile, RatingThresholds,
};
use tracing::{debug, info, instrument, warn};

/// Default number of courses returned per request
pub const DEFAULT_LIMIT: usize = 5;

/// The recommendation engine: priority tier, collaborative tier, content fallback.
pub struct HybridRecommender {
    thresholds: RatingThresholds,
    priority: PrioritySource,
    collaborative: CollaborativeSource,
    content: ContentSource,
    limit: usize,
    filter_pipeline: FilterPipeline,
}

impl Default for HybridRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl HybridRecommender {
    pub fn new() -> Self {
        Self {
            thresholds: RatingThresholds::default(),
            priority: PrioritySource,
            collaborative: CollaborativeSource::new(),
            // Content scores are computed over the whole catalog and cut after
            // bad-rated courses are removed
            content: ContentSource::new().with_limit(usize::MAX),
            limit: DEFAULT_LIMIT,
            filter_pipeline: standard_pipeline(DEFAULT_LIMIT),
        }
    }

    /// Configure the result cap (default: 5)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self.filter_pipeline = standard_pipeline(limit);
        self
    }

    /// Configure how many peer-rated courses the collaborative tier keeps (default: 5)
    pub fn with_peer_limit(mut self, limit: usize) -> Self {
        self.collaborative = self.collaborative.with_limit(limit);
        self
    }

    /// Configure the bad/high rating thresholds (default: <=2 / >=4)
    pub fn with_thresholds(mut self, thresholds: RatingThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Recommend courses for `user_id`, most relevant first.
    pub fn recommend(&self, user_id: UserId, courses: &[Course], ratings: &[Rating]) -> Vec<Course> {
        let candidates = self.recommend_candidates(user_id, courses, ratings);
        let by_id: HashMap<CourseId, &Course> = courses.iter().map(|c| (c.id, c)).collect();
        candidates
            .iter()
            .filter_map(|c| by_id.get(&c.course_id).map(|course| (*course).clone()))
            .collect()
    }

    /// Same as [`recommend`](Self::recommend), reading through a store
    pub fn recommend_from_store<S: CatalogStore + ?Sized>(&self, store: &S, user_id: UserId) -> Vec<Course> {
        let courses = store.fetch_all_courses();
        let ratings = store.fetch_all_ratings();
        self.recommend(user_id, &courses, &ratings)
    }

    /// The final candidate list, with the tier that produced each entry.
    #[instrument(skip(self, courses, ratings), fields(catalog_size = courses.len()))]
    pub fn recommend_candidates(
        &self,
        user_id: UserId,
        courses: &[Course],
        ratings: &[Rating],
    ) -> Vec<Candidate> {
        let start_time = Instant::now();

        if courses.is_empty() {
            debug!("Empty catalog, nothing to recommend");
            return Vec::new();
        }

        let profile = build_rating_profile(user_id, ratings, self.thresholds);
        if profile.is_cold_start() {
            debug!("User {} has no ratings, using content ranking", user_id);
            return self.content_fallback(courses, &profile);
        }

        let pool: Vec<&Course> = courses
            .iter()
            .filter(|c| !profile.is_bad_rated(c.id))
            .collect();
        if pool.is_empty() {
            debug!("Every course is bad-rated by user {}", user_id);
            return Vec::new();
        }

        let priority = self.priority.get_candidates(&profile, &pool);

        let known: HashSet<CourseId> = courses.iter().map(|c| c.id).collect();
        let collaborative: Vec<Candidate> = self
            .collaborative
            .get_candidates(&profile, ratings)
            .into_iter()
            .filter(|c| {
                let exists = known.contains(&c.course_id);
                if !exists {
                    warn!("Peer-rated course {} is not in the catalog", c.course_id);
                }
                exists
            })
            .collect();
        debug!(
            "Tiers for user {}: priority={}, collaborative={}",
            user_id,
            priority.len(),
            collaborative.len()
        );

        let mut merged = priority;
        merged.extend(collaborative);
        let recommendations = self.apply_filters(merged, &profile);

        let recommendations = if recommendations.is_empty() {
            debug!("No tiered candidates for user {}, using content ranking", user_id);
            self.content_fallback(courses, &profile)
        } else {
            recommendations
        };

        info!(
            "Recommended {} courses for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        recommendations
    }

    fn content_fallback(&self, courses: &[Course], profile: &RatingProfile) -> Vec<Candidate> {
        let ranked = self.content.rank(courses);
        self.apply_filters(ranked, profile)
    }

    fn apply_filters(&self, candidates: Vec<Candidate>, profile: &RatingProfile) -> Vec<Candidate> {
        // The standard filters never fail
        match self.filter_pipeline.apply(candidates, profile) {
            Ok(filtered) => filtered,
            Err(e) => {
                warn!("Filter pipeline failed: {:#}", e);
                Vec::new()
            }
        }
    }
}

fn standard_pipeline(limit: usize) -> FilterPipeline {
    FilterPipeline::new()
        .add_filter(BadRatedFilter)
        .add_filter(DeduplicateFilter)
        .add_filter(LimitFilter::new(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::CatalogIndex;
    use recommender::CandidateSource;

    fn ids(courses: &[Course]) -> Vec<CourseId> {
        courses.iter().map(|c| c.id).collect()
    }

    fn catalog(size: u32) -> Vec<Course> {
        (1..=size)
            .map(|id| Course::new(id, format!("Course {}", id)).with_syllabus("shared topic"))
            .collect()
    }

    #[test]
    fn test_empty_catalog() {
        let engine = HybridRecommender::new();
        assert!(engine.recommend(1, &[], &[Rating::new(1, 1, 5)]).is_empty());
        assert!(engine.recommend(1, &[], &[]).is_empty());
    }

    #[test]
    fn test_all_bad_rated_gives_empty_result() {
        let courses = catalog(2);
        let ratings = vec![Rating::new(1, 1, 1), Rating::new(1, 2, 2)];
        assert!(HybridRecommender::new().recommend(1, &courses, &ratings).is_empty());
    }

    #[test]
    fn test_priority_tier_first_and_capped() {
        let courses = catalog(8);
        let ratings: Vec<Rating> = (1..=7).map(|id| Rating::new(1, id, 5)).collect();

        let result = HybridRecommender::new().recommend(1, &courses, &ratings);
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5]);

        let result = HybridRecommender::new().with_limit(10).recommend(1, &courses, &ratings);
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_fallback_excludes_bad_rated() {
        // Only rating is a 1 and nobody else rated anything
        let courses = catalog(3);
        let ratings = vec![Rating::new(1, 2, 1)];

        let candidates = HybridRecommender::new().recommend_candidates(1, &courses, &ratings);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Content));
        let result: Vec<CourseId> = candidates.iter().map(|c| c.course_id).collect();
        assert_eq!(result, vec![1, 3]);
    }

    #[test]
    fn test_bad_rated_peer_course_not_backfilled() {
        // User 1 disliked course 2, which is in the peer's top five
        let courses = catalog(7);
        let mut ratings = vec![Rating::new(1, 1, 3), Rating::new(1, 2, 1)];
        for (course_id, rating) in [(1, 3), (2, 5), (3, 5), (4, 5), (5, 5), (6, 4), (7, 4)] {
            ratings.push(Rating::new(2, course_id, rating));
        }

        let candidates = HybridRecommender::new().recommend_candidates(1, &courses, &ratings);
        let result: Vec<CourseId> = candidates.iter().map(|c| c.course_id).collect();
        assert_eq!(result, vec![3, 4, 5, 6]);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Collaborative));
    }

    #[test]
    fn test_unknown_peer_course_dropped() {
        let courses = catalog(2);
        let ratings = vec![
            Rating::new(1, 1, 3),
            Rating::new(2, 1, 5),
            Rating::new(2, 99, 5),
        ];

        let candidates = HybridRecommender::new().recommend_candidates(1, &courses, &ratings);
        let result: Vec<CourseId> = candidates.iter().map(|c| c.course_id).collect();
        assert_eq!(result, vec![1]);
        assert_eq!(candidates[0].source, CandidateSource::Collaborative);
    }

    #[test]
    fn test_recommend_from_store() {
        let mut index = CatalogIndex::new();
        for course in catalog(3) {
            index.insert_course(course);
        }
        let engine = HybridRecommender::new();
        let from_store = engine.recommend_from_store(&index, 1);
        assert_eq!(from_store, engine.recommend(1, &catalog(3), &[]));
        assert_eq!(from_store.len(), 3);
    }
}
