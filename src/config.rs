use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::database::RuleDatabase;
use crate::error::Result;
use crate::heuristics::BotHeuristics;

/// Classifier settings, usually read from a YAML file.
///
/// ```yaml
/// rules: /etc/client-browser-data/rules   # directory or single file
/// empty_user_agent_is_bot: true
/// heuristics:
///   bot: [bot, spider]
///   always_bot: [yeti, ichiro]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Rule database location; the embedded rules when unset.
    pub rules: Option<PathBuf>,
    pub heuristics: BotHeuristics,
    pub empty_user_agent_is_bot: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: None,
            heuristics: BotHeuristics::default(),
            empty_user_agent_is_bot: true,
        }
    }
}

impl ClassifierConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the configured rule database: a directory in the `rules/`
    /// layout, a single YAML file, or the embedded default.
    pub fn load_database(&self) -> Result<RuleDatabase> {
        match &self.rules {
            Some(path) if path.is_dir() => RuleDatabase::from_dir(path),
            Some(path) => RuleDatabase::from_file(path),
            None => RuleDatabase::embedded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineCatalog;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ClassifierConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
        assert!(config.empty_user_agent_is_bot);
        assert_eq!(config.heuristics.bot, vec!["bot", "spider"]);
    }

    #[test]
    fn partial_override() {
        let config = ClassifierConfig::from_yaml_str(
            "empty_user_agent_is_bot: false\nheuristics:\n  always_bot: [yeti]\n",
        )
        .unwrap();
        assert!(!config.empty_user_agent_is_bot);
        assert_eq!(config.heuristics.always_bot, vec!["yeti"]);
        assert_eq!(config.heuristics.bot, vec!["bot", "spider"]);
        assert!(config.rules.is_none());
    }

    #[test]
    fn invalid_flag_is_a_yaml_error() {
        let err = ClassifierConfig::from_yaml_str("empty_user_agent_is_bot: maybe\n");
        assert!(matches!(err, Err(crate::Error::YAML(_))));
    }

    #[test]
    fn loads_database_from_directory() {
        let config = ClassifierConfig {
            rules: Some(Path::new(env!("CARGO_MANIFEST_DIR")).join("rules")),
            ..ClassifierConfig::default()
        };
        let db = config.load_database().unwrap();
        assert_eq!(db.script_version(), "2.8.41");
    }

    #[test]
    fn missing_database_file_is_io_error() {
        let config = ClassifierConfig {
            rules: Some(PathBuf::from("/nonexistent/rules.yml")),
            ..ClassifierConfig::default()
        };
        assert!(matches!(config.load_database(), Err(crate::Error::IO(_))));
    }
}
