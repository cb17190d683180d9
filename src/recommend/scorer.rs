//! Recommendation scoring
//!
//! Scores catalog courses against a profile built from the interaction
//! record. Scoring is additive: each signal contributes a weighted
//! bonus and the catalog is sorted by total score. If any catalog item
//! is malformed the whole pass falls back to unranked catalog order so
//! the caller always gets something to show.

use std::cmp::Ordering;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::CatalogItem;
use crate::interactions::InteractionRecord;

use super::preferences::{build_profile, Difficulty, LearningStyle, PreferenceProfile, MAX_PREFERRED_SUBJECTS};

/// How many recommendations to return when the caller does not ask for
/// a specific count.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 6;

// Signal thresholds. The weights applied when a threshold is met live
// in [`ScoringWeights`] so they can be tuned from config.
const RATING_TOP_MIN: f64 = 4.5;
const RATING_SOLID_MIN: f64 = 4.0;
const POPULARITY_MAJOR_THRESHOLD: u64 = 50_000;
const POPULARITY_RISING_THRESHOLD: u64 = 10_000;
const RESURFACE_WINDOW: std::ops::Range<usize> = 10..20;
const RECENT_MONTHS: f64 = 6.0;

/// Tunable weight for each scoring signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Multiplier per subject rank: rank 0 earns `5 * step`, rank 4 earns `1 * step`
    #[serde(default = "default_subject_rank_step")]
    pub subject_rank_step: f64,
    /// Course level matches the preferred difficulty exactly
    #[serde(default = "default_difficulty_exact")]
    pub difficulty_exact: f64,
    /// Course level is one step away from the preferred difficulty
    #[serde(default = "default_difficulty_adjacent")]
    pub difficulty_adjacent: f64,
    /// Rating at or above 4.5
    #[serde(default = "default_rating_top")]
    pub rating_top: f64,
    /// Rating in [4.0, 4.5)
    #[serde(default = "default_rating_solid")]
    pub rating_solid: f64,
    /// More than 50k enrolled students
    #[serde(default = "default_popularity_major")]
    pub popularity_major: f64,
    /// More than 10k enrolled students
    #[serde(default = "default_popularity_rising")]
    pub popularity_rising: f64,
    /// Clicked a while ago but not recently (positions 10..20 in click history)
    #[serde(default = "default_resurfaced_click")]
    pub resurfaced_click: f64,
    /// Deep learners get a bonus for week-long courses
    #[serde(default = "default_long_form_deep_learner")]
    pub long_form_deep_learner: f64,
    /// Explorers get a random bonus in [0, max) to vary their feed
    #[serde(default = "default_explorer_variety_max")]
    pub explorer_variety_max: f64,
    /// Released within the last six months
    #[serde(default = "default_recent_release")]
    pub recent_release: f64,
}

fn default_subject_rank_step() -> f64 {
    10.0
}

fn default_difficulty_exact() -> f64 {
    8.0
}

fn default_difficulty_adjacent() -> f64 {
    5.0
}

fn default_rating_top() -> f64 {
    7.0
}

fn default_rating_solid() -> f64 {
    5.0
}

fn default_popularity_major() -> f64 {
    4.0
}

fn default_popularity_rising() -> f64 {
    2.0
}

fn default_resurfaced_click() -> f64 {
    3.0
}

fn default_long_form_deep_learner() -> f64 {
    5.0
}

fn default_explorer_variety_max() -> f64 {
    3.0
}

fn default_recent_release() -> f64 {
    2.0
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            subject_rank_step: default_subject_rank_step(),
            difficulty_exact: default_difficulty_exact(),
            difficulty_adjacent: default_difficulty_adjacent(),
            rating_top: default_rating_top(),
            rating_solid: default_rating_solid(),
            popularity_major: default_popularity_major(),
            popularity_rising: default_popularity_rising(),
            resurfaced_click: default_resurfaced_click(),
            long_form_deep_learner: default_long_form_deep_learner(),
            explorer_variety_max: default_explorer_variety_max(),
            recent_release: default_recent_release(),
        }
    }
}

/// A scored catalog course.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub course: CatalogItem,
    pub score: f64,
}

/// Scores and ranks catalog courses for one user.
pub struct Recommender {
    weights: ScoringWeights,
    rng: Mutex<StdRng>,
}

impl Recommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seeded variant for reproducible runs.
    pub fn with_seed(weights: ScoringWeights, seed: u64) -> Self {
        Self {
            weights,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Rank the catalog for this user's record.
    ///
    /// Completed courses are filtered out and the rest are sorted by
    /// descending score. On any scoring error the first `limit` catalog
    /// items are returned unranked with a zero score instead.
    pub fn recommend(
        &self,
        record: &InteractionRecord,
        catalog: &[CatalogItem],
        limit: Option<usize>,
    ) -> Vec<Recommendation> {
        let limit = limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
        match self.score_catalog(record, catalog, limit) {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!("Scoring failed, falling back to catalog order: {}", e);
                catalog
                    .iter()
                    .take(limit)
                    .map(|course| Recommendation {
                        course: course.clone(),
                        score: 0.0,
                    })
                    .collect()
            }
        }
    }

    fn score_catalog(
        &self,
        record: &InteractionRecord,
        catalog: &[CatalogItem],
        limit: usize,
    ) -> Result<Vec<Recommendation>> {
        let profile = build_profile(record);
        let now = Utc::now();
        debug!(
            "Scoring {} catalog courses (style: {}, difficulty: {})",
            catalog.len(),
            profile.style,
            profile.difficulty
        );

        let mut ranked = Vec::with_capacity(catalog.len());
        for course in catalog {
            if record.is_completed(&course.id) {
                continue;
            }
            let score = self.score_course(course, record, &profile, now)?;
            ranked.push(Recommendation {
                course: course.clone(),
                score,
            });
        }

        // Stable sort: equal scores keep catalog order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn score_course(
        &self,
        course: &CatalogItem,
        record: &InteractionRecord,
        profile: &PreferenceProfile,
        now: DateTime<Utc>,
    ) -> Result<f64> {
        let mut score = 0.0;

        if let Some(subject) = &course.subject {
            if let Some(rank) = profile.subjects.iter().position(|s| s == subject) {
                score += (MAX_PREFERRED_SUBJECTS - rank) as f64 * self.weights.subject_rank_step;
            }
        }

        if let Some(level) = &course.level {
            // Same trim+lowercase normalization as Difficulty::parse, so
            // exact and adjacent matching agree on label spelling
            if level.trim().to_lowercase() == profile.difficulty.trim().to_lowercase() {
                score += self.weights.difficulty_exact;
            } else if let (Some(a), Some(b)) =
                (Difficulty::parse(level), Difficulty::parse(&profile.difficulty))
            {
                if a.is_adjacent(b) {
                    score += self.weights.difficulty_adjacent;
                }
            }
        }

        if course.rating >= RATING_TOP_MIN {
            score += self.weights.rating_top;
        } else if course.rating >= RATING_SOLID_MIN {
            score += self.weights.rating_solid;
        }

        if course.students > POPULARITY_MAJOR_THRESHOLD {
            score += self.weights.popularity_major;
        } else if course.students > POPULARITY_RISING_THRESHOLD {
            score += self.weights.popularity_rising;
        }

        if let Some(pos) = record.clicked_courses.iter().position(|id| id == &course.id) {
            if RESURFACE_WINDOW.contains(&pos) {
                score += self.weights.resurfaced_click;
            }
        }

        match profile.style {
            LearningStyle::DeepLearner => {
                let long_form = course
                    .duration
                    .as_deref()
                    .map_or(false, |d| d.contains("week"));
                if long_form {
                    score += self.weights.long_form_deep_learner;
                }
            }
            LearningStyle::Explorer => {
                if self.weights.explorer_variety_max > 0.0 {
                    // A poisoned lock only ever holds RNG state, safe to recover
                    let mut rng = match self.rng.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    score += rng.random_range(0.0..self.weights.explorer_variety_max);
                }
            }
            LearningStyle::Completer | LearningStyle::Beginner => {}
        }

        let released = match &course.created_at {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid created_at on course {}", course.id))?
                .with_timezone(&Utc),
            // Missing date: treat as just released
            None => now,
        };
        let months_old = (now - released).num_days() as f64 / 30.0;
        if months_old < RECENT_MONTHS {
            score += self.weights.recent_release;
        }

        Ok(score)
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}
