use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::http::DEFAULT_API_URL;

const APP_DIR: &str = "gizz";
const CONFIG_FILE: &str = "config.toml";
const USERNAME_FILE: &str = "username";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Top-level configuration loaded from `~/.config/gizz/config.toml`.
///
/// All fields are optional; the tool works with zero config for read-only
/// commands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub username. The `whoami` username file takes precedence.
    pub username: Option<String>,
    /// Personal access token. `Config::load` falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise hosts.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the user's config directory.
    /// Returns default config if the file doesn't exist. A missing token is
    /// filled in from GITHUB_TOKEN.
    pub fn load() -> Result<Config, ConfigError> {
        let path = config_dir()?.join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.fill_token(std::env::var("GITHUB_TOKEN").ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Use `fallback` as the token unless the file set a non-blank one.
    pub fn fill_token(&mut self, fallback: Option<String>) {
        if self.github_token().is_none() {
            self.github.token = fallback.filter(|t| !t.trim().is_empty());
        }
    }

    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

/// `$XDG_CONFIG_HOME/gizz`, or `~/.config/gizz` when unset.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".config"),
    };
    Ok(base.join(APP_DIR))
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

pub fn username_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(USERNAME_FILE))
}

/// Read the preferred username, if one has been stored.
pub fn read_username(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let name = contents.lines().next().unwrap_or("").trim();
            Ok((!name.is_empty()).then(|| name.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the stored username. The file is rewritten wholesale.
pub fn write_username(path: &Path, username: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", username.trim()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.username.is_none());
        assert!(config.github.token.is_none());
        assert_eq!(config.api_url(), "https://api.github.com");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
username = "alice"
token = "ghp_example"
api_url = "https://github.example.com/api/v3"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.username.as_deref(), Some("alice"));
        assert_eq!(config.github_token().as_deref(), Some("ghp_example"));
        assert_eq!(config.api_url(), "https://github.example.com/api/v3");
    }

    #[test]
    fn test_token_fallback_only_when_unset() {
        let mut config = Config::default();
        config.fill_token(Some("ghp_env".to_string()));
        assert_eq!(config.github_token().as_deref(), Some("ghp_env"));

        let mut config = Config::default();
        config.github.token = Some("ghp_file".to_string());
        config.fill_token(Some("ghp_env".to_string()));
        assert_eq!(config.github_token().as_deref(), Some("ghp_file"));

        let mut config = Config::default();
        config.github.token = Some("  ".to_string());
        config.fill_token(None);
        assert_eq!(config.github_token(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[github]\nusername = \"bob\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[github\nusername = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_username_file_roundtrip_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("username");
        assert_eq!(read_username(&path).unwrap(), None);

        write_username(&path, "alice").unwrap();
        write_username(&path, "bob").unwrap();
        assert_eq!(read_username(&path).unwrap().as_deref(), Some("bob"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "bob\n");
    }

    #[test]
    fn test_blank_username_file_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("username");
        fs::write(&path, "   \n").unwrap();
        assert_eq!(read_username(&path).unwrap(), None);
    }
}
