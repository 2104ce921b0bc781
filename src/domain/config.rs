use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::query::DEFAULT_LIMIT;

/// Configuration for the catalog service.
///
/// Controls where the catalog snapshot and requirement rules are read from,
/// and how many results a search returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the catalog snapshot (JSON).
    ///
    /// Relative paths are resolved against the directory containing the
    /// configuration file.
    pub catalog: PathBuf,

    /// Path of the requirement rules document (JSON).
    pub rules: PathBuf,

    /// Maximum number of results returned by a search.
    search_limit: usize,

    /// Upstream term code the snapshot was taken for, e.g. `2258`.
    ///
    /// Informational only.
    pub term: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            rules: default_rules(),
            search_limit: DEFAULT_LIMIT,
            term: default_term(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// Relative data paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?;

        if let Some(base) = path.parent() {
            config.catalog = base.join(&config.catalog);
            config.rules = base.join(&config.rules);
        }
        Ok(config)
    }

    /// Loads the configuration, falling back to defaults if the file does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the maximum number of search results.
    #[must_use]
    pub const fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Sets the maximum number of search results.
    ///
    /// A limit of zero is ignored.
    pub const fn set_search_limit(&mut self, limit: usize) {
        if limit > 0 {
            self.search_limit = limit;
        }
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("data/courses.json")
}

fn default_rules() -> PathBuf {
    PathBuf::from("data/requirements_rules.json")
}

const fn default_search_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_term() -> String {
    "2258".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_catalog")]
        catalog: PathBuf,

        #[serde(default = "default_rules")]
        rules: PathBuf,

        /// Maximum number of search results; zero falls back to the default.
        #[serde(default = "default_search_limit")]
        search_limit: usize,

        #[serde(default = "default_term")]
        term: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                catalog,
                rules,
                search_limit,
                term,
            } => Self {
                catalog,
                rules,
                search_limit: if search_limit == 0 {
                    DEFAULT_LIMIT
                } else {
                    search_limit
                },
                term,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            catalog: config.catalog,
            rules: config.rules,
            search_limit: config.search_limit,
            term: config.term,
        }
    }
}
