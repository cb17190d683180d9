//! Backend REST client
//!
//! Thin JSON wrapper over the platform API: generic verbs with bearer
//! token injection and Django-REST-Framework error payloads unwrapped
//! into a single readable message.

pub mod auth;
pub mod notes;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

/// Errors surfaced by the backend client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Session expired or invalid, log in again")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Authenticated JSON client for the platform backend.
pub struct ApiClient {
    base_url: String,
    http: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
            token: RwLock::new(None),
        }
    }

    /// Build from config and pick up any stored auth token.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            http: Client::new(),
            token: RwLock::new(auth::load_token()),
        }
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = self.token.read().await.as_ref() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: extract_error_message(status, &text),
            });
        }

        // 204 No Content and empty bodies deserialize as null
        if text.trim().is_empty() {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Unwrap a DRF-style error payload into one readable string.
///
/// Checks `detail`, then `non_field_errors`, then per-field error
/// arrays, and falls back to the bare HTTP status when the body is not
/// JSON at all.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }

        if let Some(errors) = value.get("non_field_errors").and_then(|e| e.as_array()) {
            let messages: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }

        if let Some(object) = value.as_object() {
            let mut parts = Vec::new();
            for (field, errors) in object {
                match errors {
                    serde_json::Value::Array(list) => {
                        if let Some(first) = list.iter().filter_map(|e| e.as_str()).next() {
                            parts.push(format!("{}: {}", field, first));
                        }
                    }
                    serde_json::Value::String(message) => {
                        parts.push(format!("{}: {}", field, message));
                    }
                    _ => {}
                }
            }
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }
    }
    format!("HTTP {}", status.as_u16())
}
