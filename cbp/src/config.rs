//! User-authored YAML configuration: categorization thresholds, header-detection flags, and
//! filepath prefix rewrites (spec §4.2, §4.9). Grounded on the original's `backend/config.hpp`/
//! `config.cpp` — the later of the two config implementations in `original_source/`, which adds
//! the threshold categorization and header-detection flags the earlier `source/config.cpp`
//! lacked.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::Milliseconds;

/// Default location `cbp-cli` looks for a config file in, relative to the invocation directory.
pub const DEFAULT_PATH: &str = ".clang-build-profiler";

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)] // pattern is a compile-time constant
    Regex::new(r"^\d+\.\d+\.\d+$").expect("invalid version regex")
});

/// Thresholds (in milliseconds) separating the four non-root [`crate::tree::TreeCategory`]
/// buckets; must be assigned in strictly ascending order (spec §3 invariant, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categorization {
    #[serde(default = "Categorization::default_gray")]
    pub gray: Milliseconds,
    #[serde(default = "Categorization::default_white")]
    pub white: Milliseconds,
    #[serde(default = "Categorization::default_yellow")]
    pub yellow: Milliseconds,
    #[serde(default = "Categorization::default_red")]
    pub red: Milliseconds,
}

impl Categorization {
    const fn default_gray() -> Milliseconds {
        Milliseconds::new(0)
    }
    const fn default_white() -> Milliseconds {
        Milliseconds::new(50)
    }
    const fn default_yellow() -> Milliseconds {
        Milliseconds::new(150)
    }
    const fn default_red() -> Milliseconds {
        Milliseconds::new(300)
    }
}

impl Default for Categorization {
    fn default() -> Self {
        Categorization {
            gray: Self::default_gray(),
            white: Self::default_white(),
            yellow: Self::default_yellow(),
            red: Self::default_red(),
        }
    }
}

/// One `from` -> `to` literal prefix rewrite applied to node filepaths during preprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixReplacementRule {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// `tree:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSection {
    #[serde(default)]
    pub categorize: Categorization,

    #[serde(default = "default_true")]
    pub detect_standard_headers: bool,
    #[serde(default = "default_true")]
    pub detect_project_headers: bool,

    #[serde(default)]
    pub replace_filepath: Vec<PrefixReplacementRule>,
}

fn default_true() -> bool {
    true
}

impl Default for TreeSection {
    fn default() -> Self {
        TreeSection {
            categorize: Categorization::default(),
            detect_standard_headers: true,
            detect_project_headers: true,
            replace_filepath: Vec::new(),
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tree: TreeSection,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: default_version(),
            tree: TreeSection::default(),
        }
    }
}

impl Config {
    /// Parses a YAML document into a [`Config`], then validates it.
    pub fn from_str(input: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(input).map_err(|e| Error::InvalidConfig {
            message: format!("could not parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the config file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig {
                message: format!("could not read config file {}: {e}", path.display()),
            }
        })?;
        Config::from_str(&contents).map_err(|e| e.context(format!("in config file {}", path.display())))
    }

    /// Returns `Ok(Config::default())` if `path` does not exist, otherwise parses it — mirrors
    /// `cbp-cli`'s "config is optional" behavior (spec §4.2: absent config uses defaults).
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        Config::from_file(path)
    }

    /// Validates the `version` schema and the strictly-ascending ordering of the categorization
    /// thresholds, returning the first violation found as an [`Error::InvalidConfig`].
    pub fn validate(&self) -> Result<()> {
        if !VERSION_PATTERN.is_match(&self.version) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "'version' has a value {{ {} }}, which does not match the schema <major>.<minor>.<patch>",
                    self.version
                ),
            });
        }

        let c = &self.tree.categorize;
        if !(c.gray < c.white && c.white < c.yellow && c.yellow < c.red) {
            return Err(Error::InvalidConfig {
                message: "'tree.categorize' thresholds must be strictly ascending (gray < white < yellow < red)"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_malformed_version() {
        let mut config = Config::default();
        config.version = "not-a-version".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_non_ascending_thresholds() {
        let mut config = Config::default();
        config.tree.categorize.white = Milliseconds::new(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn parses_replace_filepath_rules() {
        let yaml = r#"
tree:
  replace_filepath:
    - from: "/home/user/project/"
      to: ""
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.tree.replace_filepath.len(), 1);
        assert_eq!(config.tree.replace_filepath[0].from, "/home/user/project/");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = Config::from_file_or_default("/nonexistent/path/.clang-build-profiler").unwrap();
        assert_eq!(config.tree.categorize, Categorization::default());
    }
}
