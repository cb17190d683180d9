//! Local persistence for the interaction profile
//!
//! The browser build kept the profile in local storage under fixed
//! keys; here the same layout lives as JSON files under the platform
//! data directory. The repository trait is the seam the store is
//! constructed with, so tests substitute [`MemoryRepository`] for the
//! disk-backed [`JsonFileRepository`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::interactions::InteractionRecord;

/// Fixed storage key for the serialized interaction record.
pub const INTERACTIONS_KEY: &str = "user_interactions.json";

/// Fixed storage key for the mirrored bookmarked-course id list.
pub const BOOKMARKS_KEY: &str = "bookmarked_courses.json";

/// Persistence seam for the interaction profile.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Load the stored record, or an empty one when nothing is stored yet.
    async fn load(&self) -> Result<InteractionRecord>;
    /// Persist the full record.
    async fn save(&self, record: &InteractionRecord) -> Result<()>;
    /// Remove all stored profile data.
    async fn clear(&self) -> Result<()>;
}

/// File-backed repository storing JSON under fixed keys.
pub struct JsonFileRepository {
    base_dir: PathBuf,
}

impl JsonFileRepository {
    /// Create a repository at the default data directory.
    pub fn new() -> Result<Self> {
        Self::with_dir(crate::config::data_dir()?)
    }

    /// Create with a custom base directory.
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)
            .context("Failed to create profile data directory")?;
        Ok(Self { base_dir })
    }

    fn interactions_path(&self) -> PathBuf {
        self.base_dir.join(INTERACTIONS_KEY)
    }

    fn bookmarks_path(&self) -> PathBuf {
        self.base_dir.join(BOOKMARKS_KEY)
    }

    /// Get the base directory path.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }
}

#[async_trait]
impl InteractionRepository for JsonFileRepository {
    async fn load(&self) -> Result<InteractionRecord> {
        let path = self.interactions_path();
        if !path.exists() {
            return Ok(InteractionRecord::default());
        }

        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        // A corrupt profile starts over rather than wedging every
        // tracking call.
        match serde_json::from_str(&contents) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!("Stored profile at {} is unreadable ({}); starting fresh", path.display(), e);
                Ok(InteractionRecord::default())
            }
        }
    }

    async fn save(&self, record: &InteractionRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)
            .context("Failed to serialize interaction record")?;
        tokio::fs::write(self.interactions_path(), json)
            .await
            .context("Failed to write interaction record")?;

        // The bookmark id list is mirrored under its own key; the UI
        // reads it without deserializing the whole profile.
        let bookmarks = serde_json::to_string_pretty(&record.bookmarked_courses)
            .context("Failed to serialize bookmark list")?;
        tokio::fs::write(self.bookmarks_path(), bookmarks)
            .await
            .context("Failed to write bookmark list")?;

        debug!("Persisted interaction profile to {}", self.base_dir.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        for path in [self.interactions_path(), self.bookmarks_path()] {
            if path.exists() {
                tokio::fs::remove_file(&path)
                    .await
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }
}

/// In-memory repository for tests and ephemeral profiles.
#[derive(Default)]
pub struct MemoryRepository {
    record: RwLock<InteractionRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InteractionRepository for MemoryRepository {
    async fn load(&self) -> Result<InteractionRecord> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &InteractionRecord) -> Result<()> {
        *self.record.write().await = record.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.record.write().await = InteractionRecord::default();
        Ok(())
    }
}
