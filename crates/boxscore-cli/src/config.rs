// Configuration loading and validation (boxscore.toml).
//
// Lookup order: an explicit path, `./config/boxscore.toml`, the platform
// config directory, then built-in defaults. Every section and key is
// optional; missing keys take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use boxscore_baseball::feed::cached::DEFAULT_FEED_TTL_MILLIS;
use boxscore_baseball::feed::statsapi::DEFAULT_BASE_URL;
use boxscore_baseball::stats::leaderboard::MetricKey;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "boxscore.toml";

pub const DEFAULT_LOG_FILTER: &str =
    "boxscore_cli=info,boxscore_baseball=info,boxscore_core=info,warn";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub leaderboard: LeaderboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_FEED_TTL_MILLIS / 1000,
            timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    pub fn cache_ttl_millis(&self) -> u64 {
        self.cache_ttl_secs.saturating_mul(1000)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub min_at_bats: u32,
    pub top_n: usize,
    /// Metric keys, as accepted by `MetricKey::from_str`.
    pub metrics: Vec<String>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            min_at_bats: 10,
            top_n: 10,
            metrics: vec!["avg".into(), "hr".into(), "ops".into()],
        }
    }
}

impl LeaderboardConfig {
    /// Parsed metric keys. Only fails on a config that skipped validation.
    pub fn metric_keys(&self) -> Result<Vec<MetricKey>, ConfigError> {
        self.metrics
            .iter()
            .map(|m| {
                m.parse::<MetricKey>()
                    .map_err(|e| ConfigError::ValidationError {
                        field: "leaderboard.metrics".into(),
                        message: e.to_string(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    /// Log to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate the config at `path`. The file must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Candidate config locations, most specific first.
pub fn config_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join(CONFIG_FILE_NAME));
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "boxscore") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths
}

/// Resolve and load the config.
///
/// An explicit path must exist. Otherwise the first existing file among the
/// search paths is used, falling back to defaults when none exists.
/// Returns the config and the file it came from, if any.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config_from(path)?, Some(path.to_path_buf())));
    }

    for path in config_search_paths(None) {
        if path.is_file() {
            let config = load_config_from(&path)?;
            return Ok((config, Some(path)));
        }
    }

    Ok((Config::default(), None))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.feed.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "feed.base_url".into(),
            message: format!("must be an http(s) URL, got {base_url:?}"),
        });
    }

    if config.feed.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "feed.timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if config.leaderboard.top_n == 0 {
        return Err(ConfigError::ValidationError {
            field: "leaderboard.top_n".into(),
            message: "must be > 0".into(),
        });
    }

    if config.leaderboard.metrics.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "leaderboard.metrics".into(),
            message: "must name at least one metric".into(),
        });
    }
    config.leaderboard.metric_keys()?;

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.filter".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
