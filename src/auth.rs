use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::config::{self, Config, ConfigError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown user")]
    UnknownUser,

    #[error("no auth token")]
    NoAuthToken,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Username and secret for HTTP Basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Resolves who the user is and, on demand, how to authenticate as them.
///
/// Handed to the commands that need it; nothing here is global.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    config: Config,
    username_file: PathBuf,
}

impl CredentialProvider {
    pub fn new(config: Config, username_file: PathBuf) -> Self {
        Self {
            config,
            username_file,
        }
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config, config::username_file_path()?))
    }

    pub fn username_file(&self) -> &PathBuf {
        &self.username_file
    }

    /// The username stored by `whoami`, else the one from the config file.
    pub fn username(&self) -> Result<String, AuthError> {
        if let Some(name) = config::read_username(&self.username_file)? {
            debug!(source = "username file", "resolved username");
            return Ok(name);
        }
        self.config
            .github
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::UnknownUser)
    }

    /// Credentials for calls that require authorization.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        let username = self.username()?;
        let token = self.config.github_token().ok_or(AuthError::NoAuthToken)?;
        Ok(Credentials::new(username, token))
    }
}
