use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::editor::EditorError;
use crate::fetch::FetchError;
use crate::git::GitError;

#[derive(Debug, Error)]
pub enum GizzError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown user")]
    UnknownUser,

    #[error("no auth token")]
    NoAuthToken,

    #[error("Fork needed but --no-fork option passed.")]
    ForkNeeded,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid repository: {0}")]
    InvalidRepository(String),
}

impl From<AuthError> for GizzError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownUser => GizzError::UnknownUser,
            AuthError::NoAuthToken => GizzError::NoAuthToken,
            AuthError::Config(err) => GizzError::Config(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, GizzError>;

/// The text shown to the user for a failed command.
///
/// Missing username and missing token get instructions for fixing them;
/// everything else is its own message.
pub fn user_message(err: &GizzError) -> String {
    match err {
        GizzError::UnknownUser => "You need to configure your username. To do that, run:\n  \
             gizz whoami <username>"
            .to_string(),
        GizzError::NoAuthToken => {
            let location = crate::config::config_file_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "~/.config/gizz/config.toml".to_string());
            format!(
                "You need to configure your authentication token. To do that, go to\n\
                 https://github.com/settings/tokens and create a new personal access token.\n\
                 Then either export it:\n  \
                 export GITHUB_TOKEN=<token>\n\
                 or add it to {}:\n  \
                 [github]\n  \
                 token = \"<token>\"",
                location
            )
        }
        other => other.to_string(),
    }
}
