//! Keyring integration for secure API key storage
//! Falls back to file storage if keyring is unavailable

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const SERVICE_NAME: &str = "learncore";
const TUTOR_API_KEY_USERNAME: &str = "tutor-api-key";
const TUTOR_API_KEY_FILE: &str = "tutor_api_key.txt";

/// Get the path for the fallback API key file
fn tutor_api_key_file_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "learncore", "learncore")
        .context("Failed to get project directories")?;
    let dir = base.config_dir();
    fs::create_dir_all(dir).context("Failed to create config directory")?;
    Ok(dir.join(TUTOR_API_KEY_FILE))
}

/// Set tutor API key - tries keyring first, falls back to file
pub fn set_tutor_api_key(key: &str) -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, TUTOR_API_KEY_USERNAME) {
        if entry.set_password(key).is_ok() {
            // Also save to file as backup in case keyring retrieval fails
            let _ = save_to_file(key);
            return Ok(());
        }
    }

    // Fallback to file storage
    save_to_file(key)?;
    println!("Note: Using file-based storage (keyring unavailable)");
    Ok(())
}

fn save_to_file(key: &str) -> Result<()> {
    let path = tutor_api_key_file_path()?;
    fs::write(&path, key).context("Failed to write API key file")?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    Ok(())
}

/// Get tutor API key - tries keyring first, falls back to file
pub fn get_tutor_api_key() -> Result<String> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, TUTOR_API_KEY_USERNAME) {
        if let Ok(key) = entry.get_password() {
            return Ok(key);
        }
    }

    // Fallback to file
    let path = tutor_api_key_file_path()?;
    let key = fs::read_to_string(&path)
        .context("Failed to read tutor API key. Run 'learncore config --set-tutor-key YOUR_KEY' first.")?;
    Ok(key.trim().to_string())
}

/// Delete tutor API key from both keyring and file
pub fn delete_tutor_api_key() -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, TUTOR_API_KEY_USERNAME) {
        let _ = entry.delete_credential();
    }

    let path = tutor_api_key_file_path()?;
    if path.exists() {
        fs::remove_file(&path).context("Failed to delete API key file")?;
    }

    Ok(())
}

/// Check if a tutor API key is set (in either keyring or file)
pub fn has_tutor_api_key() -> bool {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, TUTOR_API_KEY_USERNAME) {
        if entry.get_password().is_ok() {
            return true;
        }
    }

    if let Ok(path) = tutor_api_key_file_path() {
        if path.exists() {
            return true;
        }
    }

    false
}
