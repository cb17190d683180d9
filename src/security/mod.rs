//! Security module
//!
//! Keyring-backed storage for the tutor API key, with a file fallback
//! when no OS keyring is available.

pub mod keyring;

use anyhow::Result;

/// Set tutor API key in secure keyring
pub fn set_tutor_api_key(key: &str) -> Result<()> {
    keyring::set_tutor_api_key(key)
}

/// Get tutor API key from secure keyring
pub fn get_tutor_api_key() -> Result<String> {
    keyring::get_tutor_api_key()
}

/// Delete tutor API key from keyring
pub fn delete_tutor_api_key() -> Result<()> {
    keyring::delete_tutor_api_key()
}

/// Check if a tutor API key is configured
pub fn has_tutor_api_key() -> bool {
    keyring::has_tutor_api_key()
}
