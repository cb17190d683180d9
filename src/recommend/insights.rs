//! Learning insights
//!
//! Turns the interaction record into a short list of human-readable
//! observations with a suggested next step. At most three insights are
//! produced, highest priority first.

use serde::Serialize;

use crate::interactions::InteractionRecord;

use super::preferences::{learning_style, preferred_subjects, LearningStyle};

/// Upper bound on the insights shown at once.
pub const MAX_INSIGHTS: usize = 3;

/// Clicking this many courses without much follow-through triggers the
/// engagement nudge.
const ENGAGEMENT_CLICK_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for InsightPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightPriority::High => write!(f, "high"),
            InsightPriority::Medium => write!(f, "medium"),
            InsightPriority::Low => write!(f, "low"),
        }
    }
}

/// One observation about the user's learning behavior.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub title: String,
    pub message: String,
    pub action: String,
    pub priority: InsightPriority,
}

/// Build up to [`MAX_INSIGHTS`] insights from the record.
///
/// The style insight is always present. A subject insight is added when
/// any subject activity exists, and an engagement nudge when the click
/// history has grown long.
pub fn generate_insights(record: &InteractionRecord) -> Vec<Insight> {
    let mut insights = vec![style_insight(record)];

    if let Some(subject) = preferred_subjects(record).first() {
        let count = record.subjects.get(subject).copied().unwrap_or(0);
        insights.push(Insight {
            title: format!("Strong interest in {}", subject),
            message: format!(
                "{} of your course views were in {}, your most active subject.",
                count, subject
            ),
            action: format!("Browse more {} courses, or branch into a related subject.", subject),
            priority: InsightPriority::Medium,
        });
    }

    if record.clicked_courses.len() > ENGAGEMENT_CLICK_THRESHOLD {
        insights.push(Insight {
            title: "Lots of browsing, little committing".to_string(),
            message: format!(
                "You've clicked into {} courses recently without finishing many.",
                record.clicked_courses.len()
            ),
            action: "Pick one clicked course and complete its first lesson.".to_string(),
            priority: InsightPriority::Low,
        });
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

fn style_insight(record: &InteractionRecord) -> Insight {
    let (title, message, action) = match learning_style(record) {
        LearningStyle::DeepLearner => (
            "You study in depth",
            "You spend well above average time on each course you open.",
            "Try a multi-week course; long-form material fits your pace.",
        ),
        LearningStyle::Explorer => (
            "You love exploring",
            "You sample a wide range of courses rather than sticking to one.",
            "Follow a structured learning path to turn breadth into depth.",
        ),
        LearningStyle::Completer => (
            "You finish what you start",
            "You complete courses at an unusually high rate.",
            "Take on an advanced certification course as your next challenge.",
        ),
        LearningStyle::Beginner => (
            "You're just getting started",
            "Your learning history is still small.",
            "Start with a highly rated beginner course to build momentum.",
        ),
    };
    Insight {
        title: title.to_string(),
        message: message.to_string(),
        action: action.to_string(),
        priority: InsightPriority::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_yields_only_style_insight() {
        let insights = generate_insights(&InteractionRecord::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, InsightPriority::High);
        assert_eq!(insights[0].title, "You're just getting started");
    }

    #[test]
    fn test_subject_activity_adds_medium_insight() {
        let mut record = InteractionRecord::default();
        record.subjects.insert("science".to_string(), 4);

        let insights = generate_insights(&record);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[1].priority, InsightPriority::Medium);
        assert!(insights[1].title.contains("science"));
        assert!(insights[1].message.contains('4'));
    }

    #[test]
    fn test_heavy_clicking_adds_engagement_nudge() {
        let mut record = InteractionRecord::default();
        record.subjects.insert("science".to_string(), 4);
        for i in 0..21 {
            record.clicked_courses.push(format!("c-{}", i));
        }

        let insights = generate_insights(&record);
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(insights[2].priority, InsightPriority::Low);
    }

    #[test]
    fn test_exactly_threshold_clicks_is_not_enough() {
        let mut record = InteractionRecord::default();
        for i in 0..ENGAGEMENT_CLICK_THRESHOLD {
            record.clicked_courses.push(format!("c-{}", i));
        }
        let insights = generate_insights(&record);
        assert!(insights
            .iter()
            .all(|i| i.priority != InsightPriority::Low));
    }

    #[test]
    fn test_deep_learner_style_text() {
        let mut record = InteractionRecord::default();
        record.course_views.insert("c".to_string(), 1);
        record.time_spent.insert("c".to_string(), 120);

        let insights = generate_insights(&record);
        assert_eq!(insights[0].title, "You study in depth");
        assert!(insights[0].action.contains("multi-week"));
    }
}
