//! Recommendation subsystem
//!
//! This module turns the raw interaction record into things the UI can
//! show:
//! - Aggregate subject/difficulty preferences and a learning style
//! - Scored, ranked course recommendations
//! - Canned human-readable insights

pub mod preferences;
pub mod scorer;
pub mod insights;

pub use preferences::{build_profile, Difficulty, LearningStyle, PreferenceProfile};
pub use scorer::{Recommendation, Recommender, ScoringWeights, DEFAULT_RECOMMENDATION_LIMIT};
pub use insights::{generate_insights, Insight, InsightPriority};
