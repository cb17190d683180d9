//! Integration tests for interaction tracking:
//! - History caps and move-to-front de-duplication
//! - Query normalization and short-query filtering
//! - Bookmark round-trips and full reset
//! - Persistence across reopen and corrupt-file recovery

use learncore::interactions::{
    CourseMeta, InteractionRecord, InteractionStore, MAX_CLICKED_COURSES, MAX_SEARCH_QUERIES,
    MIN_SEARCH_QUERY_LEN,
};
use learncore::recommend::LearningStyle;
use learncore::storage::{JsonFileRepository, MemoryRepository};
use std::sync::Arc;

async fn memory_store() -> anyhow::Result<InteractionStore> {
    Ok(InteractionStore::open(Arc::new(MemoryRepository::new())).await?)
}

#[tokio::test]
async fn test_search_history_caps_and_dedupes() -> anyhow::Result<()> {
    let store = memory_store().await?;

    for i in 0..(MAX_SEARCH_QUERIES + 10) {
        store.record_search(&format!("topic {}", i)).await?;
    }

    let record = store.snapshot().await;
    assert_eq!(record.search_queries.len(), MAX_SEARCH_QUERIES);
    assert_eq!(
        record.search_queries[0],
        format!("topic {}", MAX_SEARCH_QUERIES + 9)
    );

    // Repeating an old query moves it to the front without growing the list
    store.record_search("topic 55").await?;
    let record = store.snapshot().await;
    assert_eq!(record.search_queries.len(), MAX_SEARCH_QUERIES);
    assert_eq!(record.search_queries[0], "topic 55");
    assert_eq!(
        record
            .search_queries
            .iter()
            .filter(|q| q.as_str() == "topic 55")
            .count(),
        1
    );

    Ok(())
}

#[tokio::test]
async fn test_search_queries_normalized_and_filtered() -> anyhow::Result<()> {
    let store = memory_store().await?;

    store.record_search("  AlgEbra  ").await?;
    store.record_search("a").await?;
    store.record_search("   ").await?;

    let record = store.snapshot().await;
    assert_eq!(record.search_queries, vec!["algebra".to_string()]);

    // A trimmed query right at the minimum length is kept
    let shortest = "x".repeat(MIN_SEARCH_QUERY_LEN);
    store.record_search(&format!(" {} ", shortest)).await?;
    let record = store.snapshot().await;
    assert_eq!(record.search_queries[0], shortest);

    Ok(())
}

#[tokio::test]
async fn test_click_history_caps_and_dedupes() -> anyhow::Result<()> {
    let store = memory_store().await?;

    for i in 0..(MAX_CLICKED_COURSES + 5) {
        store.record_click(&format!("course-{}", i)).await?;
    }

    let record = store.snapshot().await;
    assert_eq!(record.clicked_courses.len(), MAX_CLICKED_COURSES);
    assert_eq!(
        record.clicked_courses[0],
        format!("course-{}", MAX_CLICKED_COURSES + 4)
    );

    store.record_click("course-50").await?;
    let record = store.snapshot().await;
    assert_eq!(record.clicked_courses.len(), MAX_CLICKED_COURSES);
    assert_eq!(record.clicked_courses[0], "course-50");

    Ok(())
}

#[tokio::test]
async fn test_view_updates_counters_and_meta() -> anyhow::Result<()> {
    let store = memory_store().await?;

    let meta = CourseMeta::new(Some("mathematics".into()), Some("beginner".into()));
    store.record_view("algebra-101", Some(&meta)).await?;
    store.record_view("algebra-101", Some(&meta)).await?;
    store.record_view("poetry-101", None).await?;

    let record = store.snapshot().await;
    assert_eq!(record.course_views.get("algebra-101"), Some(&2));
    assert_eq!(record.course_views.get("poetry-101"), Some(&1));
    assert_eq!(record.subjects.get("mathematics"), Some(&2));
    assert_eq!(record.difficulty.get("beginner"), Some(&2));
    assert_eq!(record.total_views(), 3);

    Ok(())
}

#[tokio::test]
async fn test_time_accumulates_and_completion_dedupes() -> anyhow::Result<()> {
    let store = memory_store().await?;

    store.record_time_spent("algebra-101", 120).await?;
    store.record_time_spent("algebra-101", 60).await?;
    store.record_completion("algebra-101").await?;
    store.record_completion("algebra-101").await?;

    let record = store.snapshot().await;
    assert_eq!(record.time_spent.get("algebra-101"), Some(&180));
    assert_eq!(record.total_time_spent(), 180);
    assert_eq!(record.completed_courses, vec!["algebra-101".to_string()]);
    assert!(record.is_completed("algebra-101"));
    assert!(!record.is_completed("poetry-101"));

    Ok(())
}

#[tokio::test]
async fn test_bookmark_round_trip() -> anyhow::Result<()> {
    let store = memory_store().await?;

    store.toggle_bookmark("course-a", true).await?;
    store.toggle_bookmark("course-a", true).await?;
    store.toggle_bookmark("course-b", true).await?;
    store.toggle_bookmark("never-bookmarked", false).await?;

    let record = store.snapshot().await;
    assert_eq!(
        record.bookmarked_courses,
        vec!["course-a".to_string(), "course-b".to_string()]
    );

    store.toggle_bookmark("course-a", false).await?;
    let record = store.snapshot().await;
    assert_eq!(record.bookmarked_courses, vec!["course-b".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_reset_clears_everything() -> anyhow::Result<()> {
    let store = memory_store().await?;

    let meta = CourseMeta::new(Some("science".into()), Some("advanced".into()));
    store.record_view("physics-301", Some(&meta)).await?;
    store.record_time_spent("physics-301", 900).await?;
    store.record_search("quantum mechanics").await?;
    store.record_click("physics-301").await?;
    store.toggle_bookmark("physics-301", true).await?;
    store.record_completion("physics-301").await?;

    store.reset().await?;

    let record = store.snapshot().await;
    assert_eq!(record, InteractionRecord::default());

    Ok(())
}

#[tokio::test]
async fn test_export_of_empty_store_defaults_to_beginner() -> anyhow::Result<()> {
    let store = memory_store().await?;
    let export = store.export().await;

    assert_eq!(export.preferences.style, LearningStyle::Beginner);
    assert_eq!(export.preferences.difficulty, "beginner");
    assert!(export.preferences.subjects.is_empty());
    assert_eq!(export.record, InteractionRecord::default());

    Ok(())
}

#[tokio::test]
async fn test_persistence_across_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let repo = JsonFileRepository::with_dir(dir.path().to_path_buf())?;
        let store = InteractionStore::open(Arc::new(repo)).await?;
        let meta = CourseMeta::new(Some("programming".into()), Some("intermediate".into()));
        store.record_view("rust-201", Some(&meta)).await?;
        store.record_search("ownership").await?;
        store.toggle_bookmark("rust-201", true).await?;
    }

    let repo = JsonFileRepository::with_dir(dir.path().to_path_buf())?;
    let store = InteractionStore::open(Arc::new(repo)).await?;
    let record = store.snapshot().await;

    assert_eq!(record.course_views.get("rust-201"), Some(&1));
    assert_eq!(record.subjects.get("programming"), Some(&1));
    assert_eq!(record.search_queries, vec!["ownership".to_string()]);
    assert_eq!(record.bookmarked_courses, vec!["rust-201".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_recovers_with_default() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("user_interactions.json"), "{not json")?;

    let repo = JsonFileRepository::with_dir(dir.path().to_path_buf())?;
    let store = InteractionStore::open(Arc::new(repo)).await?;

    let record = store.snapshot().await;
    assert_eq!(record, InteractionRecord::default());

    // Tracking keeps working after recovery
    store.record_view("fresh-start", None).await?;
    let record = store.snapshot().await;
    assert_eq!(record.course_views.get("fresh-start"), Some(&1));

    Ok(())
}

#[tokio::test]
async fn test_hand_edited_file_regains_sorted_sets() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("user_interactions.json"),
        r#"{"completed_courses": ["zoology-1", "algebra-1"]}"#,
    )?;

    let repo = JsonFileRepository::with_dir(dir.path().to_path_buf())?;
    let store = InteractionStore::open(Arc::new(repo)).await?;
    let record = store.snapshot().await;

    assert!(record.is_completed("zoology-1"));
    assert!(record.is_completed("algebra-1"));
    assert_eq!(
        record.completed_courses,
        vec!["algebra-1".to_string(), "zoology-1".to_string()]
    );

    Ok(())
}
