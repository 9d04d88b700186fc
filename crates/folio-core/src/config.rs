//! Configuration for folio
//!
//! Loaded from `config.toml` (default: `<config_dir>/folio/config.toml`).
//! A missing file yields defaults; a malformed one is an error.

use crate::error::{CoreError, Result};
use crate::masonry::MasonryConfig;
use folio_types::Period;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
    pub masonry: MasonryConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            server: ServerConfig::default(),
            analytics: AnalyticsConfig::default(),
            masonry: MasonryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3400,
        }
    }
}

/// Dashboard aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Maximum rows in the top-content ranking
    pub top_content_limit: usize,
    /// Maximum entries in the recent-activity feed
    pub recent_activity_limit: usize,
    /// Period used when a request names neither a period nor dates
    pub default_period: Period,
    /// Longest window a dashboard request may cover, in calendar days
    pub max_window_days: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_content_limit: 10,
            recent_activity_limit: 10,
            default_period: Period::Month,
            max_window_days: 731,
        }
    }
}

impl FolioConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&content).map_err(|err| match err {
            CoreError::ConfigParse { source, .. } => CoreError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| CoreError::ConfigParse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analytics.top_content_limit == 0 {
            return Err(invalid("analytics.top_content_limit must be at least 1"));
        }
        if self.analytics.recent_activity_limit == 0 {
            return Err(invalid("analytics.recent_activity_limit must be at least 1"));
        }
        if self.analytics.max_window_days == 0 {
            return Err(invalid("analytics.max_window_days must be at least 1"));
        }
        self.masonry.validate().map_err(invalid)
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig {
        message: message.into(),
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("folio").join("folio.db"))
        .unwrap_or_else(|| PathBuf::from("folio.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = FolioConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.server.port, 3400);
        assert_eq!(config.analytics.default_period, Period::Month);
        assert_eq!(config.masonry.max_columns, 5);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = FolioConfig::from_toml(
            r#"
            database_path = "/srv/folio/site.db"

            [server]
            port = 8080

            [analytics]
            default_period = "7d"

            [masonry]
            resize_debounce_ms = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/folio/site.db"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.analytics.default_period, Period::Week);
        assert_eq!(config.analytics.top_content_limit, 10);
        assert_eq!(config.analytics.max_window_days, 731);
        assert_eq!(config.masonry.resize_debounce_ms, 200);
        assert_eq!(config.masonry.mutation_debounce_ms, 10);
    }

    #[test]
    fn test_unknown_period_is_parse_error() {
        let err = FolioConfig::from_toml("[analytics]\ndefault_period = \"14d\"\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let err = FolioConfig::from_toml("[masonry]\nmax_columns = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();

        match FolioConfig::load(&path) {
            Err(CoreError::ConfigParse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
