//! Course catalog types and loading
//!
//! The catalog is supplied by an external data source (a static JSON
//! dataset in this build) and is read-only to the rest of the crate.
//! Fields mirror the upstream shape, so level and creation date arrive
//! as plain strings rather than parsed types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single course as published by the catalog source.
///
/// This crate never mutates catalog items; the scorer only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable course identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Subject/category label (e.g. "mathematics")
    #[serde(default)]
    pub subject: Option<String>,
    /// Difficulty level label as published ("beginner", "intermediate", ...)
    #[serde(default)]
    pub level: Option<String>,
    /// Average rating, 0.0-5.0
    #[serde(default)]
    pub rating: f64,
    /// Enrolled student count
    #[serde(default)]
    pub students: u64,
    /// Free-text duration (e.g. "6 weeks", "3 hours")
    #[serde(default)]
    pub duration: Option<String>,
    /// RFC 3339 creation timestamp; absent for legacy entries
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Load a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
    Ok(items)
}

/// The static dataset shipped with the binary.
pub fn bundled_catalog() -> Result<Vec<CatalogItem>> {
    serde_json::from_str(include_str!("../data/catalog.json"))
        .context("Bundled catalog is malformed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_parses() {
        let items = bundled_catalog().unwrap();
        assert!(!items.is_empty());
        // Every bundled entry carries an id and a subject
        for item in &items {
            assert!(!item.id.is_empty());
            assert!(item.subject.is_some(), "missing subject on {}", item.id);
        }
    }

    #[test]
    fn test_partial_item_parses() {
        // External entries may omit optional metadata entirely
        let item: CatalogItem =
            serde_json::from_str(r#"{"id": "c-1", "title": "Intro"}"#).unwrap();
        assert_eq!(item.id, "c-1");
        assert!(item.level.is_none());
        assert!(item.created_at.is_none());
        assert_eq!(item.students, 0);
    }
}
