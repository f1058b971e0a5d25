//! Pipeline for filtering recommendation candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! The hybrid engine concatenates the priority and collaborative tiers and
//! passes the result through a pipeline:
//! 1. BadRatedFilter drops anything the user rated 2 or lower
//! 2. DeduplicateFilter keeps the first occurrence of each course
//! 3. LimitFilter caps the list
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(BadRatedFilter)
//!     .add_filter(DeduplicateFilter)
//!     .add_filter(LimitFilter::new(5));
//!
//! let filtered = pipeline.apply(candidates, &profile)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
