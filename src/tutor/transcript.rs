//! Chat transcript persistence
//!
//! One JSON file per tutoring session under the data directory, named
//! `chat_<session-id>.json`, holding the ordered message list.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

use crate::types::Message;

/// Stores tutoring conversations on disk, one file per session.
pub struct TranscriptStore {
    base_dir: PathBuf,
}

impl TranscriptStore {
    /// Create a store under the default data directory.
    pub fn new() -> Result<Self> {
        let base_dir = crate::config::data_dir()?.join("transcripts");
        Self::with_dir(base_dir)
    }

    /// Create with a custom directory.
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir).context("Failed to create transcript directory")?;
        Ok(Self { base_dir })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("chat_{}.json", session_id))
    }

    /// Generate a fresh session id.
    pub fn new_session() -> String {
        Uuid::new_v4().to_string()
    }

    /// First eight characters of a session id, for display. Ids are
    /// caller-supplied, so this must not assume ASCII.
    pub fn short_id(session_id: &str) -> String {
        session_id.chars().take(8).collect()
    }

    /// Append one message to a session, creating it if needed.
    pub fn append(&self, session_id: &str, message: &Message) -> Result<()> {
        let mut messages = self.load(session_id)?;
        messages.push(message.clone());

        let path = self.session_path(session_id);
        let json =
            serde_json::to_string_pretty(&messages).context("Failed to serialize transcript")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        debug!("Appended {} message to session {}", message.role.as_wire_str(), session_id);
        Ok(())
    }

    /// Load a session's messages. Unknown sessions load as empty.
    pub fn load(&self, session_id: &str) -> Result<Vec<Message>> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse transcript {}", path.display()))
    }

    /// List session ids, most recently touched first.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let mut sessions: Vec<(SystemTime, String)> = Vec::new();
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        for entry in std::fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(id) = name_str
                .strip_prefix("chat_")
                .and_then(|s| s.strip_suffix(".json"))
            {
                let modified = entry
                    .metadata()?
                    .modified()
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                sessions.push((modified, id.to_string()));
            }
        }

        sessions.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(sessions.into_iter().map(|(_, id)| id).collect())
    }

    /// Delete every stored transcript, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for id in self.list_sessions()? {
            let path = self.session_path(&id);
            if path.exists() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::with_dir(dir.path().to_path_buf()).unwrap();

        let session = TranscriptStore::new_session();
        store.append(&session, &Message::user("What is recursion?")).unwrap();
        store.append(&session, &Message::assistant("A function calling itself.")).unwrap();

        let messages = store.load(&session).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "What is recursion?");
        assert_eq!(messages[1].content, "A function calling itself.");
    }

    #[test]
    fn test_unknown_session_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::with_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load("no-such-session").unwrap().is_empty());
    }

    #[test]
    fn test_short_id_truncates_on_char_boundaries() {
        let generated = TranscriptStore::new_session();
        assert_eq!(TranscriptStore::short_id(&generated).len(), 8);

        // Caller-supplied id whose eighth byte falls inside 'é'
        assert_eq!(TranscriptStore::short_id("lectureé"), "lectureé");
        assert_eq!(TranscriptStore::short_id("révision-fractions"), "révision");
        assert_eq!(TranscriptStore::short_id("abc"), "abc");
    }

    #[test]
    fn test_list_sessions_finds_created_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::with_dir(dir.path().to_path_buf()).unwrap();

        let a = TranscriptStore::new_session();
        let b = TranscriptStore::new_session();
        store.append(&a, &Message::user("first")).unwrap();
        store.append(&b, &Message::user("second")).unwrap();

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.contains(&a));
        assert!(sessions.contains(&b));
    }

    #[test]
    fn test_unrelated_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::with_dir(dir.path().to_path_buf()).unwrap();

        std::fs::write(dir.path().join("notes.txt"), "not a transcript").unwrap();
        assert!(store.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn test_clear_removes_all_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::with_dir(dir.path().to_path_buf()).unwrap();

        for i in 0..3 {
            let session = TranscriptStore::new_session();
            store.append(&session, &Message::user(format!("msg {}", i))).unwrap();
        }

        assert_eq!(store.clear().unwrap(), 3);
        assert!(store.list_sessions().unwrap().is_empty());
    }
}
