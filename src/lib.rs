//! Learncore - Learning Platform Client Library
//!
//! The client-side engine of an online learning platform:
//! - Local interaction tracking (views, time spent, searches, clicks, bookmarks)
//! - Preference aggregation and scored course recommendations
//! - AI tutor chat with provider failover and an offline fallback
//! - Token-authenticated backend API for notes and notification counts
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use learncore::interactions::InteractionStore;
//! use learncore::recommend::Recommender;
//! use learncore::storage::JsonFileRepository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InteractionStore::open(Arc::new(JsonFileRepository::new()?)).await?;
//!     store.record_view("algebra-101", None).await?;
//!
//!     let record = store.snapshot().await;
//!     let catalog = learncore::catalog::bundled_catalog()?;
//!     for pick in Recommender::default().recommend(&record, &catalog, None) {
//!         println!("{} ({:.1})", pick.course.title, pick.score);
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod types;
pub mod storage;
pub mod interactions;
pub mod catalog;
pub mod config;
pub mod security;
pub mod cli;

// Feature modules
pub mod recommend;
pub mod tutor;
pub mod api;
pub mod notifications;

// Re-export commonly used types for convenience
pub use interactions::{InteractionRecord, InteractionStore, ProfileExport};
pub use storage::{InteractionRepository, JsonFileRepository, MemoryRepository};
pub use catalog::CatalogItem;
pub use config::Config;
pub use recommend::{
    build_profile,
    generate_insights,
    PreferenceProfile,
    Recommendation,
    Recommender,
};
pub use tutor::{TutorClient, TutorReply};
pub use api::{ApiClient, ApiError};

pub use security::{
    set_tutor_api_key,
    get_tutor_api_key,
    delete_tutor_api_key,
    has_tutor_api_key,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Learning Platform Client Library", NAME, VERSION)
}
