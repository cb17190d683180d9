//! Authentication flows
//!
//! Login, registration, and logout against the backend, with the auth
//! token stored in a file under the data directory so sessions survive
//! restarts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiClient;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Basic account info returned after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

fn token_path() -> Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("auth_token"))
}

/// Read the stored token, if any.
pub fn load_token() -> Option<String> {
    let path = token_path().ok()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn store_token(token: &str) -> Result<()> {
    let path = token_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create data directory")?;
    }
    std::fs::write(&path, token)
        .with_context(|| format!("Failed to write auth token to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)?;
    }
    Ok(())
}

/// Remove the stored token. Missing file is fine.
pub fn clear_token() -> Result<()> {
    let path = token_path()?;
    if path.exists() {
        std::fs::remove_file(&path).context("Failed to remove auth token")?;
    }
    Ok(())
}

/// Log in and persist the returned token.
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<()> {
    let request = LoginRequest { username, password };
    let response: TokenResponse = client.post("/auth/login/", &request).await?;

    store_token(&response.token)?;
    client.set_token(Some(response.token)).await;
    debug!("Logged in as {}", username);
    Ok(())
}

/// Create an account, then log straight in with the returned token.
pub async fn register(client: &ApiClient, username: &str, email: &str, password: &str) -> Result<()> {
    let request = RegisterRequest {
        username,
        email,
        password,
    };
    let response: TokenResponse = client.post("/auth/register/", &request).await?;

    store_token(&response.token)?;
    client.set_token(Some(response.token)).await;
    debug!("Registered account {}", username);
    Ok(())
}

/// Fetch the account profile for the active session.
pub async fn current_user(client: &ApiClient) -> Result<UserProfile> {
    Ok(client.get("/auth/user/").await?)
}

/// Log out locally and best-effort on the server.
///
/// The local token is always cleared, even when the server call fails,
/// so a dead backend can never trap the user in a session.
pub async fn logout(client: &ApiClient) -> Result<()> {
    if client.has_token().await {
        if let Err(e) = client.post::<_, serde_json::Value>("/auth/logout/", &()).await {
            warn!("Server logout failed, clearing local session anyway: {}", e);
        }
    }
    clear_token()?;
    client.set_token(None).await;
    Ok(())
}
