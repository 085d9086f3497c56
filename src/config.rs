//! Configuration file handling
//!
//! `<config dir>/deckweave/config.toml`:
//! ```toml
//! url = "http://127.0.0.1:8765"
//! decks = ["Japanese::Vocab", "Japanese::Kanji"]
//! filter = "is:new"
//! mode = "field"
//! field = "Rank"
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anki::{DEFAULT_FILTER, DEFAULT_URL};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine the config directory")]
    ConfigDirNotFound,

    #[error("No decks configured. Set `decks` in the config file or pass --deck.")]
    NoDecks,

    #[error("Mode 'field' needs a field name. Set `field` in the config file or pass --field.")]
    MissingField,

    #[error("Timeout must be at least one second")]
    InvalidTimeout,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How computed ranks are written back to Anki
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Set each card's 1-based new-card due position
    #[default]
    Position,
    /// Write the rank as text into a field of each card's note
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AnkiConnect endpoint
    pub url: String,
    /// Decks to interleave, in tie-break order
    pub decks: Vec<String>,
    /// Search terms appended to each deck query
    pub filter: String,
    pub mode: ApplyMode,
    /// Note field receiving the rank when `mode = "field"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            decks: Vec::new(),
            filter: DEFAULT_FILTER.to_string(),
            mode: ApplyMode::Position,
            field: None,
            timeout_secs: 30,
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub decks: Vec<String>,
    pub filter: Option<String>,
    pub mode: Option<ApplyMode>,
    pub field: Option<String>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("deckweave").join("config.toml"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply command-line overrides; a non-empty deck list replaces the file's
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if !overrides.decks.is_empty() {
            self.decks = overrides.decks;
        }
        if let Some(filter) = overrides.filter {
            self.filter = filter;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if overrides.field.is_some() {
            self.field = overrides.field;
        }
        self
    }

    /// Check the settings needed to schedule and write ranks
    pub fn validate(&self) -> Result<()> {
        if self.decks.is_empty() {
            return Err(ConfigError::NoDecks);
        }
        if self.mode == ApplyMode::Field
            && self.field.as_deref().map_or(true, |f| f.trim().is_empty())
        {
            return Err(ConfigError::MissingField);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.url, "http://127.0.0.1:8765");
        assert_eq!(config.filter, "is:new");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
decks = ["Vocab", "Kanji"]
mode = "field"
field = "Rank"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.decks, vec!["Vocab", "Kanji"]);
        assert_eq!(config.mode, ApplyMode::Field);
        assert_eq!(config.field.as_deref(), Some("Rank"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "mode = \"sideways\"").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::parse("decks = [\"a\"]\nfilter = \"is:new -is:suspended\"").unwrap();
        let config = config.with_overrides(Overrides {
            url: Some("http://localhost:9999".to_string()),
            decks: vec!["b".to_string(), "c".to_string()],
            mode: Some(ApplyMode::Field),
            field: Some("Order".to_string()),
            ..Default::default()
        });

        assert_eq!(config.url, "http://localhost:9999");
        assert_eq!(config.decks, vec!["b", "c"]);
        assert_eq!(config.filter, "is:new -is:suspended");
        assert_eq!(config.field.as_deref(), Some("Order"));
    }

    #[test]
    fn test_empty_override_keeps_file_decks() {
        let config = Config::parse("decks = [\"a\"]").unwrap().with_overrides(Overrides::default());
        assert_eq!(config.decks, vec!["a"]);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(Config::default().validate(), Err(ConfigError::NoDecks)));

        let mut config = Config {
            decks: vec!["a".to_string()],
            mode: ApplyMode::Field,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingField)));

        config.field = Some("Rank".to_string());
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }
}
