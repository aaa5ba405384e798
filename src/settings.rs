//! Persisted settings for the prompt-refiner CLI.
//! Stored in the platform-specific config directory via `directories::ProjectDirs`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::refine::{ClientConfig, Domain, ExpertiseLevel, OutputFormat, RefineOptions};
use crate::retry::RetryConfig;

/// Settings errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(String),
    #[error("Failed to serialize settings: {0}")]
    SerializeError(String),
}

/// Settings that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Refinement service base URL
    pub base_url: String,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound on any retry delay in milliseconds
    pub max_delay_ms: u64,
    /// Backoff growth factor
    pub multiplier: f64,
    /// Domain applied when none is given on the command line
    pub domain: Option<Domain>,
    /// Expertise level applied when none is given on the command line
    pub expertise_level: Option<ExpertiseLevel>,
    /// Output format applied when none is given on the command line
    pub output_format: Option<OutputFormat>,
    /// Best-practices flag applied when none is given on the command line
    pub include_best_practices: Option<bool>,
    /// Examples flag applied when none is given on the command line
    pub include_examples: Option<bool>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: client.base_url,
            timeout_secs: client.timeout.as_secs(),
            max_retries: client.retry.max_retries,
            initial_delay_ms: client.retry.initial_delay.as_millis() as u64,
            max_delay_ms: client.retry.max_delay.as_millis() as u64,
            multiplier: client.retry.multiplier,
            domain: None,
            expertise_level: None,
            output_format: None,
            include_best_practices: None,
            include_examples: None,
        }
    }
}

impl AppSettings {
    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "prompt-refiner", "prompt-refiner")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path.
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load() -> Self {
        Self::settings_path()
            .map(Self::load_or_default)
            .unwrap_or_default()
    }

    /// Load settings from a specific file, logging a warning and falling
    /// back to defaults if it cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable settings file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Load settings from a specific file. A missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| SettingsError::ParseError(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Retry policy described by these settings.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }

    /// Client configuration described by these settings.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry_config())
    }

    /// Options to fall back on when the caller leaves a field unset.
    pub fn default_options(&self) -> RefineOptions {
        RefineOptions {
            domain: self.domain,
            expertise_level: self.expertise_level,
            output_format: self.output_format,
            include_best_practices: self.include_best_practices,
            include_examples: self.include_examples,
        }
    }

    /// Overwrite the stored defaults with every field set in `options`.
    pub fn apply_options(&mut self, options: RefineOptions) {
        let merged = options.or(self.default_options());
        self.domain = merged.domain;
        self.expertise_level = merged.expertise_level;
        self.output_format = merged.output_format;
        self.include_best_practices = merged.include_best_practices;
        self.include_examples = merged.include_examples;
    }
}
