//! One function per subcommand. Commands write their results to `out`;
//! failures are returned, never printed.

pub mod fork;
pub mod list;
pub mod pulls;
pub mod whoami;

use std::sync::Arc;
use tracing::debug;

use crate::auth::CredentialProvider;
use crate::error::{GizzError, Result};
use crate::git::{github_remote, parse_remotes, GitGateway, Remote};
use crate::github::{Client, RepoSlug};

/// Everything a command may talk to.
pub struct Context {
    pub client: Client,
    pub git: Arc<dyn GitGateway>,
    pub auth: CredentialProvider,
}

impl Context {
    pub fn new(client: Client, git: Arc<dyn GitGateway>, auth: CredentialProvider) -> Self {
        Self { client, git, auth }
    }

    pub async fn remotes(&self) -> Result<Vec<Remote>> {
        let output = self.git.capture(&["remote", "-v", "show"]).await?;
        Ok(parse_remotes(&output))
    }

    /// The repository a command acts on: `--repo` when given, else the
    /// GitHub remote named after the user, else `origin`.
    pub async fn resolve_repo(&self, repo_arg: Option<&str>) -> Result<RepoSlug> {
        if let Some(arg) = repo_arg {
            return parse_repo_arg(arg);
        }

        let remotes = self.remotes().await?;
        // The username only picks a remote here; not knowing it is fine.
        let username = self.auth.username().ok();
        let slug = username
            .as_deref()
            .and_then(|name| github_remote(&remotes, name))
            .or_else(|| github_remote(&remotes, "origin"))
            .ok_or_else(|| {
                GizzError::InvalidRepository(
                    "no GitHub remote found; pass --repo OWNER/REPO".to_string(),
                )
            })?;
        debug!(repo = %slug, "resolved repository from remotes");
        Ok(slug)
    }
}

pub fn parse_repo_arg(arg: &str) -> Result<RepoSlug> {
    arg.parse()
        .map_err(|e: crate::github::ParseSlugError| GizzError::InvalidArgument(e.to_string()))
}
