//! Wire shapes of the GitHub REST API responses this tool reads.
//!
//! Only the fields used are declared; serde ignores the rest.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::RepoSlug;
use crate::api::ApiError;

pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub following: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentPayload {
    pub name: String,
    pub owner: OwnerPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub owner: OwnerPayload,
    pub git_url: Option<String>,
    pub clone_url: Option<String>,
    pub ssh_url: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ParentPayload>,
}

impl RepoPayload {
    pub fn slug(&self) -> RepoSlug {
        RepoSlug::new(&self.owner.login, &self.name)
    }

    /// URL for read-only fetches. HTTPS clone URLs work without keys,
    /// `git://` is only used when the host doesn't send one.
    pub fn read_only_url(&self) -> String {
        self.clone_url
            .clone()
            .or_else(|| self.git_url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchPayload {
    pub name: String,
    pub commit: CommitPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    pub name: String,
    pub commit: CommitPayload,
    pub tarball_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullSummaryPayload {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRefPayload {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub user: Option<OwnerPayload>,
    /// Null when the head fork has been deleted.
    pub repo: Option<RepoPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullPayload {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub created_at: String,
    pub mergeable: Option<bool>,
    pub head: PullRefPayload,
    pub base: PullRefPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub user: OwnerPayload,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergePayload {
    pub sha: Option<String>,
    #[serde(default)]
    pub merged: bool,
    pub message: Option<String>,
}
