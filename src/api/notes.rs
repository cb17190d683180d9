//! Notes CRUD against the backend

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ApiClient;

/// A study note as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct NotePayload<'a> {
    title: &'a str,
    content: &'a str,
}

pub async fn list_notes(client: &ApiClient) -> Result<Vec<Note>> {
    Ok(client.get("/notes/").await?)
}

pub async fn create_note(client: &ApiClient, title: &str, content: &str) -> Result<Note> {
    let payload = NotePayload { title, content };
    Ok(client.post("/notes/", &payload).await?)
}

pub async fn update_note(client: &ApiClient, id: u64, title: &str, content: &str) -> Result<Note> {
    let payload = NotePayload { title, content };
    Ok(client.put(&format!("/notes/{}/", id), &payload).await?)
}

pub async fn delete_note(client: &ApiClient, id: u64) -> Result<()> {
    Ok(client.delete(&format!("/notes/{}/", id)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_parses_with_missing_timestamps() {
        let json = r#"{"id": 3, "title": "Limits", "content": "Review epsilon-delta"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, 3);
        assert_eq!(note.title, "Limits");
        assert!(note.created_at.is_none());
    }

    #[test]
    fn test_note_payload_shape() {
        let payload = NotePayload {
            title: "Limits",
            content: "Review epsilon-delta",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Limits");
        assert_eq!(json["content"], "Review epsilon-delta");
    }
}
