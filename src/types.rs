//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A single message in a tutor conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system message stamped with the current time
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Convert to the chat-completion wire role string
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parse from a chat-completion wire role string
    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
            Role::System => write!(f, "System"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_round_trip() {
        for role in [Role::User, Role::Assistant, Role::System] {
            assert_eq!(Role::from_wire_str(role.as_wire_str()), Some(role));
        }
        assert_eq!(Role::from_wire_str("tool"), None);
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hello").role, Role::Assistant);
        assert_eq!(Message::system("rules").role, Role::System);
    }
}
