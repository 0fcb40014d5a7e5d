//! Configuration file parser for ~/.config/mediacat/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{Settings, ViewOptions};
use crate::content::{DEFAULT_FEED_LIMIT, DEFAULT_LANDING_COUNT, DEFAULT_PAGE_SIZE};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite catalog location. `None` means `<config dir>/catalog.db`.
    pub database_path: Option<PathBuf>,

    /// Base URL used for links in rendered feeds.
    pub site_url: String,

    /// Items in each landing list (latest / popular).
    pub landing_count: usize,

    /// Items per page on listing views.
    pub page_size: usize,

    /// Feed size when the request does not name one.
    pub feed_default_limit: usize,

    /// Upper bound a requested feed size is clamped to.
    pub feed_max_limit: usize,

    /// Whether the feed view is served at all.
    pub rss_display: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            site_url: "http://localhost".to_string(),
            landing_count: DEFAULT_LANDING_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            feed_default_limit: DEFAULT_FEED_LIMIT,
            feed_max_limit: 100,
            rss_display: true,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "database_path",
        "site_url",
        "landing_count",
        "page_size",
        "feed_default_limit",
        "feed_max_limit",
        "rss_display",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Zero sizes or limits → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(path = %path.display(), rss_display = config.rss_display, "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("landing_count", self.landing_count),
            ("page_size", self.page_size),
            ("feed_default_limit", self.feed_default_limit),
            ("feed_max_limit", self.feed_max_limit),
        ];
        for (key, value) in sizes {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Resolve the catalog database path against the config directory.
    pub fn database_path_in(&self, config_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir.join("catalog.db"))
    }

    /// Sizes and limits used by the catalog endpoints.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            landing_count: self.landing_count,
            page_size: self.page_size,
            feed_default_limit: self.feed_default_limit,
            feed_max_limit: self.feed_max_limit,
        }
    }
}

impl Settings for Config {
    fn feed_enabled(&self) -> bool {
        self.rss_display
    }
}

// ============================================================================
// Tests
// ============================================================================
