//! Configuration management
//!
//! Manages client configuration: backend API location, tutor providers,
//! recommendation tuning, and notification polling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::recommend::{ScoringWeights, DEFAULT_RECOMMENDATION_LIMIT};
use crate::tutor::ProviderConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// AI tutor provider settings
    #[serde(default)]
    pub tutor: TutorConfig,
    /// Recommendation tuning
    #[serde(default)]
    pub recommend: RecommendConfig,
    /// Notification polling
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL including the API prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Primary chat completion provider
    #[serde(default = "ProviderConfig::groq")]
    pub primary: ProviderConfig,
    /// Tried when the primary fails
    #[serde(default = "ProviderConfig::openrouter")]
    pub fallback: ProviderConfig,
    /// Completion token cap per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::groq(),
            fallback: ProviderConfig::openrouter(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// How many recommendations to show when no limit is given
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Scoring signal weights
    #[serde(default)]
    pub weights: ScoringWeights,
}

fn default_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            weights: ScoringWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Seconds between unread count polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            tutor: TutorConfig::default(),
            recommend: RecommendConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "learncore", "learncore")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "learncore", "learncore")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!("  backend:        {}", config.api.base_url);
    println!(
        "  tutor primary:  {} ({})",
        config.tutor.primary.name, config.tutor.primary.model
    );
    println!(
        "  tutor fallback: {} ({})",
        config.tutor.fallback.name, config.tutor.fallback.model
    );
    println!(
        "  tutor key:      {}",
        if crate::security::has_tutor_api_key() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("  recommendations: {} per request", config.recommend.limit);
    println!(
        "  notifications:  poll every {}s",
        config.notifications.poll_interval_secs
    );

    println!("\n💡 Use 'learncore config --set-tutor-key <KEY>' to enable the online tutor");

    Ok(())
}

/// Store the tutor API key
pub fn set_tutor_key(key: &str) -> Result<()> {
    crate::security::set_tutor_api_key(key)?;
    println!("Tutor API key stored securely.");
    Ok(())
}

/// Point the client at a different backend
pub fn set_base_url(url: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.api.base_url = url.trim_end_matches('/').to_string();
    config.save()?;
    println!("Backend base URL set to {}", config.api.base_url);
    Ok(())
}

/// Change the default recommendation count
pub fn set_recommendation_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        anyhow::bail!("Recommendation limit must be at least 1");
    }
    let mut config = Config::load()?;
    config.recommend.limit = limit;
    config.save()?;
    println!("Recommendation limit set to {}", limit);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.tutor.primary.name, "groq");
        assert_eq!(config.recommend.limit, DEFAULT_RECOMMENDATION_LIMIT);
        assert_eq!(config.notifications.poll_interval_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let toml = r#"
            [api]
            base_url = "https://learn.example.com/api"

            [recommend]
            limit = 10
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://learn.example.com/api");
        assert_eq!(config.recommend.limit, 10);
        assert_eq!(config.tutor.max_tokens, 1024);
        assert_eq!(config.recommend.weights.difficulty_exact, 8.0);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.api.base_url, config.api.base_url);
        assert_eq!(reparsed.tutor.fallback.base_url, config.tutor.fallback.base_url);
    }
}
