// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error as DError;

#[derive(Debug, Clone, DError, PartialEq)]
pub enum ConfigError {
    #[error("selector.candidates must be at least 1")]
    ZeroCandidates,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub candidates: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { candidates: 10 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub selector: SelectorConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let parsed: Self = toml::from_str(contents)?;

        if parsed.selector.candidates == 0 {
            return Err(ConfigError::ZeroCandidates.into());
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn load_example_config() -> Result<(), Error> {
        let expected = Config {
            database: DatabaseConfig {
                path: Some("restaurants.sqlite".into()),
            },
            selector: SelectorConfig { candidates: 10 },
            log: LogConfig {
                level: "info".into(),
            },
        };

        let loaded = Config::load("example.toml")?;
        assert_eq!(expected, loaded);

        Ok(())
    }

    #[test]
    fn missing_sections_use_defaults() -> Result<(), Error> {
        let parsed = Config::from_toml("[selector]\ncandidates = 3\n")?;

        assert_eq!(parsed.selector.candidates, 3);
        assert_eq!(parsed.database.path, None);
        assert_eq!(parsed.log.level, "info");
        assert_eq!(Config::from_toml("")?, Config::default());

        Ok(())
    }

    #[test]
    fn zero_candidates_is_rejected() {
        let err = Config::from_toml("[selector]\ncandidates = 0\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroCandidates)
        );
    }
}
