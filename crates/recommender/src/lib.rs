//! # Recommender Crate
//!
//! Candidate sources for course recommendations.
//!
//! ## Components
//!
//! ### Priority Source
//! Courses the user already rated highly (4 or 5) that are still eligible.
//!
//! ### Collaborative Source
//! User-based filtering: peers are the users who rated any course the target
//! user rated; courses are ranked by the peers' mean rating.
//!
//! ### Content Source
//! TF-IDF over `title + syllabus`, courses ranked by aggregate cosine
//! similarity to the rest of the catalog. Used for cold start and as the final
//! fallback.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommender::{build_rating_profile, CollaborativeSource, ContentSource, RatingThresholds};
//!
//! let profile = build_rating_profile(user_id, &all_ratings, RatingThresholds::default());
//! let collaborative = CollaborativeSource::new().get_candidates(&profile, &all_ratings);
//! let cold_start = ContentSource::new().rank(&all_courses);
//! ```

pub mod types;
pub mod profile;
pub mod priority;
pub mod collaborative;
pub mod stop_words;
pub mod tfidf;
pub mod content;

pub use collaborative::CollaborativeSource;
pub use content::ContentSource;
pub use priority::PrioritySource;
pub use profile::build_rating_profile;
pub use tfidf::TfIdfModel;
pub use types::{Candidate, CandidateSource, RatingProfile, RatingThresholds};
