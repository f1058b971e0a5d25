//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to candidate lists.

use anyhow::Result;
use recommender::{Candidate, RatingProfile};

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// Filters take ownership of the list and return it filtered. They must keep
/// the relative order of the candidates they retain: ranking is decided by
/// the sources, never by a filter.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a list of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `profile` - The requesting user's rating profile
    fn apply(
        &self,
        candidates: Vec<Candidate>,
        profile: &RatingProfile,
    ) -> Result<Vec<Candidate>>;
}
