//! End-to-end recommendation scenarios:
//! - Profile-driven ranking over a small catalog
//! - Completion filtering, limits, and the catalog-order fallback
//! - Seeded reproducibility for explorer feeds
//! - Insight generation from tracked activity

use learncore::catalog::CatalogItem;
use learncore::interactions::InteractionRecord;
use learncore::recommend::{
    build_profile, generate_insights, InsightPriority, LearningStyle, Recommender, ScoringWeights,
    DEFAULT_RECOMMENDATION_LIMIT,
};

fn course(id: &str, subject: &str, level: &str, rating: f64, students: u64) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        title: id.to_string(),
        subject: Some(subject.to_string()),
        level: Some(level.to_string()),
        rating,
        students,
        duration: None,
        created_at: None,
    }
}

#[test]
fn test_math_learner_gets_math_first() {
    let mut record = InteractionRecord::default();
    record.subjects.insert("mathematics".into(), 5);
    record.subjects.insert("science".into(), 2);
    record.difficulty.insert("intermediate".into(), 4);
    record.course_views.insert("seed-course".into(), 7);

    let catalog = vec![
        course("poetry-basics", "literature", "beginner", 3.0, 100),
        course("calculus-1", "mathematics", "intermediate", 4.6, 60_000),
        course("chemistry-1", "science", "beginner", 4.2, 8_000),
    ];

    let picks = Recommender::new(ScoringWeights::default()).recommend(&record, &catalog, None);

    let ids: Vec<&str> = picks.iter().map(|p| p.course.id.as_str()).collect();
    assert_eq!(ids, vec!["calculus-1", "chemistry-1", "poetry-basics"]);

    // Top subject (50), exact difficulty (8), top rating (7),
    // major popularity (4), recent release (2)
    assert_eq!(picks[0].score, 71.0);
}

#[test]
fn test_completed_courses_never_recommended() {
    let mut record = InteractionRecord::default();
    record.completed_courses.push("calculus-1".to_string());

    let catalog = vec![
        course("calculus-1", "mathematics", "intermediate", 4.6, 60_000),
        course("chemistry-1", "science", "beginner", 4.2, 8_000),
    ];

    let picks = Recommender::new(ScoringWeights::default()).recommend(&record, &catalog, None);

    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].course.id, "chemistry-1");
}

#[test]
fn test_limit_and_descending_order() {
    let record = InteractionRecord::default();
    let catalog: Vec<CatalogItem> = (0..10)
        .map(|i| {
            course(
                &format!("c{}", i),
                "misc",
                "beginner",
                3.0 + (i as f64) * 0.2,
                1_000 * i as u64,
            )
        })
        .collect();
    let recommender = Recommender::new(ScoringWeights::default());

    let picks = recommender.recommend(&record, &catalog, Some(3));
    assert_eq!(picks.len(), 3);
    assert!(picks.windows(2).all(|w| w[0].score >= w[1].score));

    let picks = recommender.recommend(&record, &catalog, None);
    assert_eq!(picks.len(), DEFAULT_RECOMMENDATION_LIMIT);
}

#[test]
fn test_resurfaced_click_outranks_recent_click() {
    let mut record = InteractionRecord::default();
    // Most-recent-first: "click-0" was just clicked, "click-15" a while ago
    record.clicked_courses = (0..20).map(|i| format!("click-{}", i)).collect();

    let catalog = vec![
        course("click-2", "misc", "beginner", 3.0, 0),
        course("click-15", "misc", "beginner", 3.0, 0),
    ];

    let picks = Recommender::new(ScoringWeights::default()).recommend(&record, &catalog, None);

    assert_eq!(picks[0].course.id, "click-15");
    assert_eq!(
        picks[0].score - picks[1].score,
        ScoringWeights::default().resurfaced_click
    );
}

#[test]
fn test_seeded_recommendations_are_reproducible() {
    let mut record = InteractionRecord::default();
    for i in 0..60 {
        record.course_views.insert(format!("v{}", i), 1);
    }
    assert_eq!(build_profile(&record).style, LearningStyle::Explorer);

    let catalog: Vec<CatalogItem> = (0..8)
        .map(|i| course(&format!("c{}", i), "misc", "beginner", 4.0, 0))
        .collect();

    let a = Recommender::with_seed(ScoringWeights::default(), 7).recommend(&record, &catalog, Some(8));
    let b = Recommender::with_seed(ScoringWeights::default(), 7).recommend(&record, &catalog, Some(8));

    let ids_a: Vec<&str> = a.iter().map(|p| p.course.id.as_str()).collect();
    let ids_b: Vec<&str> = b.iter().map(|p| p.course.id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
    for (x, y) in a.iter().zip(&b) {
        assert!((x.score - y.score).abs() < f64::EPSILON);
    }
}

#[test]
fn test_malformed_date_falls_back_to_catalog_order() {
    let mut record = InteractionRecord::default();
    record.completed_courses.push("b".to_string());

    let mut catalog = vec![
        course("a", "misc", "beginner", 4.8, 90_000),
        course("b", "misc", "beginner", 3.0, 10),
        course("c", "misc", "beginner", 3.2, 20),
    ];
    catalog[2].created_at = Some("not-a-date".to_string());

    let picks = Recommender::new(ScoringWeights::default()).recommend(&record, &catalog, Some(2));

    // Catalog order with zero scores; the fallback skips the completed filter
    let ids: Vec<&str> = picks.iter().map(|p| p.course.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(picks.iter().all(|p| p.score == 0.0));
}

#[test]
fn test_insights_reflect_style_subject_and_engagement() {
    let mut record = InteractionRecord::default();
    record.subjects.insert("mathematics".into(), 9);
    record.course_views.insert("a".into(), 3);
    record.time_spent.insert("a".into(), 600);
    record.clicked_courses = (0..25).map(|i| format!("c{}", i)).collect();

    let insights = generate_insights(&record);

    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0].priority, InsightPriority::High);
    assert!(insights.iter().any(|i| i.message.contains("mathematics")));
    assert!(insights
        .iter()
        .any(|i| i.priority == InsightPriority::Low && i.message.contains("25")));
}

#[test]
fn test_empty_record_yields_single_starter_insight() {
    let insights = generate_insights(&InteractionRecord::default());

    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].priority, InsightPriority::High);
    assert_eq!(insights[0].title, "You're just getting started");
}
