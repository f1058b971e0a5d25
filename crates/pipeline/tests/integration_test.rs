//! Integration tests for the pipeline.
//!
//! These tests run real candidate sources over a small catalog and push the
//! tiers through the standard filter chain.

use catalog::{CatalogIndex, Course, Rating, User};
use pipeline::filters::*;
use pipeline::FilterPipeline;
use recommender::{
    build_rating_profile, Candidate, CandidateSource, CollaborativeSource, PrioritySource,
    RatingThresholds,
};

fn create_test_setup() -> CatalogIndex {
    let mut index = CatalogIndex::new();

    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        index.insert_user(User {
            id,
            username: name.to_string(),
            email: format!("{}@example.com", name),
        });
    }

    for (id, title) in [
        (1, "Rust Basics"),
        (2, "Intro to Pandas"),
        (3, "Logo Design"),
        (4, "Async Rust"),
        (5, "Statistics 101"),
    ] {
        index.insert_course(Course::new(id, title));
    }

    // alice: loves 1, hates 2
    index.upsert_rating(Rating::new(1, 1, 5)).unwrap();
    index.upsert_rating(Rating::new(1, 2, 1)).unwrap();
    // bob shares course 1 with alice
    index.upsert_rating(Rating::new(2, 1, 4)).unwrap();
    index.upsert_rating(Rating::new(2, 2, 5)).unwrap();
    index.upsert_rating(Rating::new(2, 4, 5)).unwrap();
    // carol shares course 2 with alice
    index.upsert_rating(Rating::new(3, 2, 4)).unwrap();
    index.upsert_rating(Rating::new(3, 5, 3)).unwrap();

    index
}

fn standard_pipeline() -> FilterPipeline {
    FilterPipeline::new()
        .add_filter(BadRatedFilter)
        .add_filter(DeduplicateFilter)
        .add_filter(LimitFilter::new(5))
}

#[test]
fn test_tiers_through_pipeline() {
    let index = create_test_setup();
    let ratings: Vec<Rating> = index.ratings().cloned().collect();
    let courses: Vec<&Course> = index.courses().collect();
    let profile = build_rating_profile(1, &ratings, RatingThresholds::default());

    let pool: Vec<&Course> = courses
        .into_iter()
        .filter(|c| !profile.is_bad_rated(c.id))
        .collect();

    let mut candidates = PrioritySource.get_candidates(&profile, &pool);
    candidates.extend(CollaborativeSource::new().get_candidates(&profile, &ratings));

    let filtered = standard_pipeline().apply(candidates, &profile).unwrap();
    let ids: Vec<u32> = filtered.iter().map(|c| c.course_id).collect();

    // Priority tier first, then peer means: 4 -> 5.0, 2 -> 4.5 (bad), 1 -> 4.0 (dup), 5 -> 3.0
    assert_eq!(ids, vec![1, 4, 5]);
    assert_eq!(filtered[0].source, CandidateSource::Priority);
    assert_eq!(filtered[1].source, CandidateSource::Collaborative);
    assert!(!ids.contains(&2));
}

#[test]
fn test_pipeline_caps_output() {
    let profile = build_rating_profile(9, &[], RatingThresholds::default());
    let candidates: Vec<Candidate> = (1..=12)
        .map(|id| Candidate::new(id, CandidateSource::Collaborative, 3.0))
        .collect();

    let filtered = standard_pipeline().apply(candidates, &profile).unwrap();
    assert_eq!(filtered.len(), 5);
    assert_eq!(filtered[0].course_id, 1);
}
