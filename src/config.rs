use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{BurndownError, Result};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REPORT_DIR: &str = "reports";
const DEFAULT_BACKUP_DIR: &str = "data/processed";

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_team: Option<String>,
    /// Directory scanned for sprint CSV files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Where sprint reports are written (e.g. an Obsidian vault folder)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
    /// Where processed sprint files are moved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| BurndownError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::parse(&contents).map_err(|e| BurndownError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "burndown")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(BurndownError::NoConfigDir)
    }

    /// Get API key with env var taking precedence over config file
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("LINEAR_API_KEY") {
            return Ok(key);
        }

        self.api_key.clone().ok_or(BurndownError::MissingApiKey)
    }

    /// Get team, preferring explicit argument over default
    pub fn resolve_team(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(String::from)
            .or_else(|| self.default_team.clone())
    }

    pub fn resolve_data_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        resolve_dir(explicit, &self.data_dir, DEFAULT_DATA_DIR)
    }

    pub fn resolve_report_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        resolve_dir(explicit, &self.report_dir, DEFAULT_REPORT_DIR)
    }

    pub fn resolve_backup_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        resolve_dir(explicit, &self.backup_dir, DEFAULT_BACKUP_DIR)
    }
}

fn resolve_dir(explicit: Option<PathBuf>, configured: &Option<PathBuf>, default: &str) -> PathBuf {
    explicit
        .or_else(|| configured.clone())
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
api_key = "lin_api_123"
default_team = "ENG"
data_dir = "/srv/sprints"
report_dir = "/vault/Sprint_Reports"
backup_dir = "/srv/sprints/done"
"#,
        )
        .unwrap();

        assert_eq!(config.default_team.as_deref(), Some("ENG"));
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("/srv/sprints"));
        assert_eq!(
            config.resolve_report_dir(None),
            PathBuf::from("/vault/Sprint_Reports")
        );
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("data"));
        assert_eq!(config.resolve_report_dir(None), PathBuf::from("reports"));
        assert_eq!(config.resolve_backup_dir(None), PathBuf::from("data/processed"));
    }

    #[test]
    fn test_explicit_dir_wins() {
        let config = Config::parse(r#"data_dir = "/srv/sprints""#).unwrap();
        assert_eq!(
            config.resolve_data_dir(Some(PathBuf::from("./local"))),
            PathBuf::from("./local")
        );
    }

    #[test]
    fn test_resolve_team() {
        let config = Config::parse(r#"default_team = "ENG""#).unwrap();
        assert_eq!(config.resolve_team(Some("OPS")).as_deref(), Some("OPS"));
        assert_eq!(config.resolve_team(None).as_deref(), Some("ENG"));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Config {
            default_team: Some("ENG".to_string()),
            report_dir: Some(PathBuf::from(r"C:\Users\me\Vault\Sprint_Reports")),
            ..Config::default()
        };
        let text = config.to_toml().unwrap();
        assert!(!text.contains("api_key"));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        assert!(Config::parse("data_dir = 5").is_err());
    }
}
