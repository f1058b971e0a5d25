//! Filter implementations for the candidate pipeline.

pub mod bad_rated;
pub mod deduplicate;
pub mod limit;

// Re-export for convenience
pub use bad_rated::BadRatedFilter;
pub use deduplicate::DeduplicateFilter;
pub use limit::LimitFilter;
