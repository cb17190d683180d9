//! Preference aggregation
//!
//! Pure functions over an [`InteractionRecord`] snapshot. Safe to call
//! at any time, including on an empty record, where every function
//! falls back to a sane default.

use serde::{Deserialize, Serialize};

use crate::interactions::InteractionRecord;

/// How many preferred subjects the profile carries.
pub const MAX_PREFERRED_SUBJECTS: usize = 5;

/// Fallback difficulty label when no difficulty data exists.
pub const DEFAULT_DIFFICULTY: &str = "beginner";

// Learning-style thresholds. Evaluated in a fixed order; the first
// matching branch wins.
const DEEP_LEARNER_SECS_PER_VIEW: f64 = 30.0;
const EXPLORER_VIEW_THRESHOLD: u64 = 50;
const COMPLETER_COURSE_THRESHOLD: usize = 10;

/// The three difficulty levels the scorer understands. Labels outside
/// this set still count in the record; they just never match here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Parse a catalog level label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    /// Whether two levels sit next to each other on the ladder
    /// (beginner↔intermediate, intermediate↔advanced).
    pub fn is_adjacent(self, other: Difficulty) -> bool {
        use Difficulty::*;
        matches!(
            (self, other),
            (Beginner, Intermediate)
                | (Intermediate, Beginner)
                | (Intermediate, Advanced)
                | (Advanced, Intermediate)
        )
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

/// Coarse behavioral classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    DeepLearner,
    Explorer,
    Completer,
    Beginner,
}

impl std::fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LearningStyle::DeepLearner => write!(f, "deep_learner"),
            LearningStyle::Explorer => write!(f, "explorer"),
            LearningStyle::Completer => write!(f, "completer"),
            LearningStyle::Beginner => write!(f, "beginner"),
        }
    }
}

/// Aggregated preferences, embedded in the export snapshot and fed to
/// the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Up to five subject labels, most preferred first
    pub subjects: Vec<String>,
    /// Difficulty label with the highest interaction count
    pub difficulty: String,
    /// Derived learning style
    pub style: LearningStyle,
}

/// Up to five subject labels, sorted by descending interaction count.
///
/// The sort is stable, so subjects with equal counts keep the record
/// map's iteration order rather than being re-sorted.
pub fn preferred_subjects(record: &InteractionRecord) -> Vec<String> {
    let mut entries: Vec<(&String, &u64)> = record.subjects.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries
        .into_iter()
        .take(MAX_PREFERRED_SUBJECTS)
        .map(|(subject, _)| subject.clone())
        .collect()
}

/// The difficulty label with the highest count, `"beginner"` when no
/// difficulty data exists. Ties keep the first label in map order.
pub fn preferred_difficulty(record: &InteractionRecord) -> String {
    let mut best: Option<(&String, u64)> = None;
    for (label, &count) in &record.difficulty {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
        .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string())
}

/// Classify the profile's learning style.
///
/// Branch order matters: a user with both a high average time per view
/// and a high view count is a deep learner, not an explorer.
pub fn learning_style(record: &InteractionRecord) -> LearningStyle {
    let total_views = record.total_views();
    let average_time_per_view = if total_views == 0 {
        0.0
    } else {
        record.total_time_spent() as f64 / total_views as f64
    };

    if average_time_per_view > DEEP_LEARNER_SECS_PER_VIEW {
        LearningStyle::DeepLearner
    } else if total_views > EXPLORER_VIEW_THRESHOLD {
        LearningStyle::Explorer
    } else if record.completed_courses.len() > COMPLETER_COURSE_THRESHOLD {
        LearningStyle::Completer
    } else {
        LearningStyle::Beginner
    }
}

/// Bundle the three aggregates into one profile.
pub fn build_profile(record: &InteractionRecord) -> PreferenceProfile {
    PreferenceProfile {
        subjects: preferred_subjects(record),
        difficulty: preferred_difficulty(record),
        style: learning_style(record),
    }
}
