//! Interaction Store - durable accumulation of behavioral signals
//!
//! Every tracking call mutates the in-memory record and persists the
//! full record through the injected repository before returning, so a
//! crash between events loses at most the in-flight event. The store
//! is constructed once at startup and shared by reference; there is no
//! module-level singleton.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::recommend::preferences::{self, PreferenceProfile};
use crate::storage::InteractionRepository;

/// Search history cap, most-recent-first.
pub const MAX_SEARCH_QUERIES: usize = 50;

/// Click history cap, most-recent-first.
pub const MAX_CLICKED_COURSES: usize = 100;

/// Queries shorter than this (after trimming) are dropped.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Optional course metadata forwarded with a view event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseMeta {
    /// Subject/category label, when the caller has it
    pub subject: Option<String>,
    /// Difficulty level label, when the caller has it
    pub level: Option<String>,
}

impl CourseMeta {
    pub fn new(subject: Option<String>, level: Option<String>) -> Self {
        Self { subject, level }
    }
}

/// The per-profile behavioral record.
///
/// Counter maps use `BTreeMap` so iteration order is deterministic;
/// the aggregator's tie-breaking and the persisted JSON both depend on
/// that. The two id sets stay sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// View counter per course
    #[serde(default)]
    pub course_views: BTreeMap<String, u64>,
    /// Cumulative seconds spent per course
    #[serde(default)]
    pub time_spent: BTreeMap<String, u64>,
    /// Interest counter per subject label
    #[serde(default)]
    pub subjects: BTreeMap<String, u64>,
    /// Interest counter per difficulty label
    #[serde(default)]
    pub difficulty: BTreeMap<String, u64>,
    /// Courses the user finished; excluded from recommendations
    #[serde(default)]
    pub completed_courses: Vec<String>,
    /// Courses the user bookmarked
    #[serde(default)]
    pub bookmarked_courses: Vec<String>,
    /// Search queries, most-recent-first, capped
    #[serde(default)]
    pub search_queries: Vec<String>,
    /// Clicked course ids, most-recent-first, capped
    #[serde(default)]
    pub clicked_courses: Vec<String>,
}

impl InteractionRecord {
    /// Total recorded course views.
    pub fn total_views(&self) -> u64 {
        self.course_views.values().sum()
    }

    /// Total recorded seconds across all courses.
    pub fn total_time_spent(&self) -> u64 {
        self.time_spent.values().sum()
    }

    /// Whether the user completed the given course.
    pub fn is_completed(&self, course_id: &str) -> bool {
        self.completed_courses.binary_search(&course_id.to_string()).is_ok()
    }

    /// Re-establish the sorted-set and history-cap invariants. Needed
    /// after loading a store file that was edited outside this crate,
    /// since `is_completed` and the bookmark ops binary-search the sets.
    fn restore_invariants(&mut self) {
        self.completed_courses.sort();
        self.completed_courses.dedup();
        self.bookmarked_courses.sort();
        self.bookmarked_courses.dedup();
        self.search_queries.truncate(MAX_SEARCH_QUERIES);
        self.clicked_courses.truncate(MAX_CLICKED_COURSES);
    }
}

/// Immutable data-portability snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileExport {
    pub exported_at: DateTime<Utc>,
    pub preferences: PreferenceProfile,
    pub record: InteractionRecord,
}

/// Move `value` to the front of `list`, de-duplicating and truncating
/// to `cap`.
fn promote_front(list: &mut Vec<String>, value: String, cap: usize) {
    if let Some(pos) = list.iter().position(|v| v == &value) {
        list.remove(pos);
    }
    list.insert(0, value);
    list.truncate(cap);
}

/// Insert into a sorted id set; returns false if already present.
fn insert_sorted(set: &mut Vec<String>, value: String) -> bool {
    match set.binary_search(&value) {
        Ok(_) => false,
        Err(pos) => {
            set.insert(pos, value);
            true
        }
    }
}

/// Remove from a sorted id set; returns false if absent.
fn remove_sorted(set: &mut Vec<String>, value: &str) -> bool {
    match set.binary_search(&value.to_string()) {
        Ok(pos) => {
            set.remove(pos);
            true
        }
        Err(_) => false,
    }
}

/// Durable per-profile interaction store.
pub struct InteractionStore {
    record: RwLock<InteractionRecord>,
    repo: Arc<dyn InteractionRepository>,
}

impl InteractionStore {
    /// Open the store, loading any previously persisted record. The
    /// loaded record's invariants are restored in case the file was
    /// edited by hand.
    pub async fn open(repo: Arc<dyn InteractionRepository>) -> Result<Self> {
        let mut record = repo.load().await?;
        record.restore_invariants();
        Ok(Self {
            record: RwLock::new(record),
            repo,
        })
    }

    /// Record a course view, plus subject/level interest when metadata
    /// is available. No-op for an empty course id.
    pub async fn record_view(&self, course_id: &str, meta: Option<&CourseMeta>) -> Result<()> {
        if course_id.is_empty() {
            return Ok(());
        }

        let mut record = self.record.write().await;
        *record.course_views.entry(course_id.to_string()).or_insert(0) += 1;

        if let Some(meta) = meta {
            if let Some(subject) = meta.subject.as_deref().filter(|s| !s.is_empty()) {
                *record.subjects.entry(subject.to_string()).or_insert(0) += 1;
            }
            if let Some(level) = meta.level.as_deref().filter(|l| !l.is_empty()) {
                *record.difficulty.entry(level.to_string()).or_insert(0) += 1;
            }
        }

        debug!("Recorded view of {}", course_id);
        self.repo.save(&record).await
    }

    /// Add time spent on a course. No-op when the id is empty or the
    /// duration is zero.
    pub async fn record_time_spent(&self, course_id: &str, seconds: u64) -> Result<()> {
        if course_id.is_empty() || seconds == 0 {
            return Ok(());
        }

        let mut record = self.record.write().await;
        *record.time_spent.entry(course_id.to_string()).or_insert(0) += seconds;
        self.repo.save(&record).await
    }

    /// Mark a course completed. Completed courses never resurface in
    /// recommendations.
    pub async fn record_completion(&self, course_id: &str) -> Result<()> {
        if course_id.is_empty() {
            return Ok(());
        }

        let mut record = self.record.write().await;
        if insert_sorted(&mut record.completed_courses, course_id.to_string()) {
            debug!("Recorded completion of {}", course_id);
        }
        self.repo.save(&record).await
    }

    /// Add or remove a bookmark.
    pub async fn toggle_bookmark(&self, course_id: &str, bookmarking: bool) -> Result<()> {
        if course_id.is_empty() {
            return Ok(());
        }

        let mut record = self.record.write().await;
        if bookmarking {
            insert_sorted(&mut record.bookmarked_courses, course_id.to_string());
        } else {
            remove_sorted(&mut record.bookmarked_courses, course_id);
        }
        self.repo.save(&record).await
    }

    /// Record a search query. Queries shorter than two characters are
    /// dropped; the stored form is trimmed and lower-cased.
    pub async fn record_search(&self, query: &str) -> Result<()> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Ok(());
        }

        let mut record = self.record.write().await;
        promote_front(
            &mut record.search_queries,
            trimmed.to_lowercase(),
            MAX_SEARCH_QUERIES,
        );
        self.repo.save(&record).await
    }

    /// Record a course click (card open, link follow).
    pub async fn record_click(&self, course_id: &str) -> Result<()> {
        if course_id.is_empty() {
            return Ok(());
        }

        let mut record = self.record.write().await;
        promote_front(
            &mut record.clicked_courses,
            course_id.to_string(),
            MAX_CLICKED_COURSES,
        );
        self.repo.save(&record).await
    }

    /// Re-initialize the record and remove all persisted profile data.
    pub async fn reset(&self) -> Result<()> {
        let mut record = self.record.write().await;
        *record = InteractionRecord::default();
        self.repo.clear().await
    }

    /// Data-portability snapshot: the raw record plus the derived
    /// preferences.
    pub async fn export(&self) -> ProfileExport {
        let record = self.record.read().await.clone();
        let preferences = preferences::build_profile(&record);
        ProfileExport {
            exported_at: Utc::now(),
            preferences,
            record,
        }
    }

    /// Clone of the current record for the pure aggregation and
    /// scoring functions.
    pub async fn snapshot(&self) -> InteractionRecord {
        self.record.read().await.clone()
    }
}
