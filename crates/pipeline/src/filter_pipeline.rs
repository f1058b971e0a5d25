//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use anyhow::Result;
use recommender::{Candidate, RatingProfile};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(BadRatedFilter)
///     .add_filter(DeduplicateFilter)
///     .add_filter(LimitFilter::new(5));
///
/// let filtered = pipeline.apply(candidates, &profile)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the configured filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - The filtered candidates after all filters
    /// * `Err` - If any filter fails
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        profile: &RatingProfile,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, profile)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BadRatedFilter, LimitFilter};
    use recommender::CandidateSource;

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let profile = RatingProfile::new(1);

        let candidates = vec![
            Candidate::new(1, CandidateSource::Collaborative, 4.0),
            Candidate::new(2, CandidateSource::Content, 0.8),
        ];

        let filtered = pipeline.apply(candidates, &profile).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filters_run_in_order() {
        let mut profile = RatingProfile::new(1);
        profile.bad_rated.insert(1);

        let pipeline = FilterPipeline::new()
            .add_filter(LimitFilter::new(2))
            .add_filter(BadRatedFilter);
        assert_eq!(pipeline.filter_names(), vec!["LimitFilter", "BadRatedFilter"]);

        let candidates = vec![
            Candidate::new(1, CandidateSource::Collaborative, 5.0),
            Candidate::new(2, CandidateSource::Collaborative, 4.0),
            Candidate::new(3, CandidateSource::Collaborative, 3.0),
        ];

        // Limit first, so only course 2 survives
        let filtered = pipeline.apply(candidates, &profile).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].course_id, 2);
    }
}
