// Configuration loading and parsing (config/settings.toml, optional).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a compiled default; a
/// `config/settings.toml` file, when present, overrides them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Season end year (2021 means the 2020/21 season).
    pub season: u16,
    /// How many ranked rows to print.
    pub top_n: usize,
    /// Courtesy delay between paginated salary requests. Zero disables it.
    pub request_delay_ms: u64,
    /// SQLite store path. Presence of this file gates whether we scrape.
    pub db_path: String,
    /// Base URL for the stats site (team leaderboard and per-team pages).
    pub stats_base_url: String,
    /// Base URL for the salary listing.
    pub salary_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season: 2021,
            top_n: 10,
            request_delay_ms: 1000,
            db_path: "nba.db".to_string(),
            stats_base_url: "https://www.espn.com/nba".to_string(),
            salary_base_url: "http://www.espn.com/nba/salaries".to_string(),
        }
    }
}

impl Config {
    /// Post-season offensive leaderboard, ordered by average points
    /// descending. The ordering is what makes team output reproducible.
    pub fn leaderboard_url(&self) -> String {
        format!(
            "{}/stats/team/_/view/team/season/{}/seasontype/3/table/offensive/sort/avgPoints/dir/desc",
            self.stats_base_url, self.season
        )
    }

    /// Per-team post-season stats page.
    pub fn team_stats_url(&self, slug: &str) -> String {
        format!(
            "{}/team/stats/_/name/{}/season/{}/seasontype/3",
            self.stats_base_url, slug, self.season
        )
    }

    /// First page of the salary listing (carries the season in the path).
    pub fn salary_first_page_url(&self) -> String {
        format!("{}/_/year/{}/seasontype/4", self.salary_base_url, self.season)
    }

    /// Page `page` of the salary listing, for pages 2 and up.
    pub fn salary_page_url(&self, page: usize) -> String {
        format!("{}/_/page/{}/seasontype/4", self.salary_base_url, page)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/settings.toml` under `base_dir`, falling
/// back to compiled defaults when the file does not exist.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("settings.toml");

    let config = if path.exists() {
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?
    } else {
        Config::default()
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !(1950..=2100).contains(&config.season) {
        return Err(ConfigError::ValidationError {
            field: "season".into(),
            message: format!("must be a season end year, got {}", config.season),
        });
    }

    if config.top_n == 0 {
        return Err(ConfigError::ValidationError {
            field: "top_n".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "db_path".into(),
            message: "must not be empty".into(),
        });
    }

    for (field, url) in [
        ("stats_base_url", &config.stats_base_url),
        ("salary_base_url", &config.salary_base_url),
    ] {
        if !url.starts_with("http") {
            return Err(ConfigError::ValidationError {
                field: field.into(),
                message: format!("must be an http(s) URL, got {url:?}"),
            });
        }
        if url.ends_with('/') {
            return Err(ConfigError::ValidationError {
                field: field.into(),
                message: "must not end with a slash".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
