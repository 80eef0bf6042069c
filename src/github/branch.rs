use serde_json::json;
use tracing::{info, instrument};

use super::{Client, RepoSlug};
use crate::api::ApiError;
use crate::auth::Credentials;

/// A branch of a repository on the host, as the API describes it.
pub struct Branch {
    client: Client,
    repo: RepoSlug,
    name: String,
    sha: Option<String>,
    git_url: Option<String>,
}

impl Branch {
    pub fn new(client: Client, repo: RepoSlug, name: impl Into<String>) -> Self {
        Self {
            client,
            repo,
            name: name.into(),
            sha: None,
            git_url: None,
        }
    }

    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    pub fn with_git_url(mut self, git_url: impl Into<String>) -> Self {
        self.git_url = Some(git_url.into());
        self
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// Remote URL of the repository holding this branch; only known for
    /// pull request heads.
    pub fn git_url(&self) -> Option<&str> {
        self.git_url.as_deref()
    }

    /// Open a pull request asking for `source` to be merged into this branch.
    #[instrument(skip(self, body, source, credentials), fields(base = %self.repo, head = %source.repo))]
    pub async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        source: &Branch,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        let request = json!({
            "title": title,
            "body": body,
            "head": format!("{}:{}", source.owner(), source.name()),
            "base": self.name,
        });
        self.client
            .post(
                "/repos/{user}/{repo}/pulls",
                &[("user", self.repo.owner.as_str()), ("repo", self.repo.name.as_str())],
                Some(request),
                Some(credentials),
            )
            .await?;
        info!(head = source.name(), base = %self.name, "created pull request");
        Ok(())
    }
}

impl std::fmt::Debug for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Branch")
            .field("repo", &self.repo)
            .field("name", &self.name)
            .field("sha", &self.sha)
            .field("git_url", &self.git_url)
            .finish_non_exhaustive()
    }
}

/// A tag; immutable once read from the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub repo: RepoSlug,
    pub name: String,
    pub sha: String,
    pub tarball_url: String,
}

impl Tag {
    /// The first ten characters of the commit hash.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..10).unwrap_or(&self.sha)
    }
}
