use serde_json::json;
use tracing::{debug, instrument};

use super::types::{
    decode, CommentPayload, MergePayload, PullPayload, PullRefPayload, PullSummaryPayload,
};
use super::{Branch, Client, Lazy, RepoSlug};
use crate::api::ApiError;
use crate::auth::Credentials;

/// Title and body; known from listings without the detail fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PullSummary {
    pub title: String,
    pub body: String,
}

/// Fields only the detail endpoint returns.
#[derive(Debug)]
pub struct PullDetails {
    pub created_at: String,
    /// None while the host is still computing mergeability.
    pub mergeable: Option<bool>,
    pub head: Branch,
    pub base: Branch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub body: String,
}

/// Result of asking the host to merge a pull request.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged { sha: String, message: String },
    /// The host refused; the message says why (conflicts, not mergeable...).
    Rejected { message: String },
}

pub struct PullRequest {
    client: Client,
    repo: RepoSlug,
    number: u64,
    summary: Lazy<PullSummary>,
    details: Lazy<PullDetails>,
}

pub(crate) async fn fetch_pull(
    client: &Client,
    repo: &RepoSlug,
    number: u64,
) -> Result<PullPayload, ApiError> {
    debug!(%repo, number, "loading pull request details");
    let id = number.to_string();
    let value = client
        .get(
            "/repos/{user}/{repo}/pulls/{id}",
            &[
                ("user", repo.owner.as_str()),
                ("repo", repo.name.as_str()),
                ("id", id.as_str()),
            ],
        )
        .await?;
    decode(value)
}

fn split_payload(client: &Client, payload: PullPayload) -> (PullSummary, PullDetails) {
    let summary = PullSummary {
        title: payload.title,
        body: payload.body.unwrap_or_default(),
    };
    let details = PullDetails {
        created_at: payload.created_at,
        mergeable: payload.mergeable,
        head: branch_from_ref(client, payload.head),
        base: branch_from_ref(client, payload.base),
    };
    (summary, details)
}

fn branch_from_ref(client: &Client, payload: PullRefPayload) -> Branch {
    let (slug, git_url) = match &payload.repo {
        Some(repo) => (repo.slug(), Some(repo.read_only_url())),
        // The fork is gone; keep the owner so the branch can still be named.
        None => {
            let owner = payload.user.map(|u| u.login).unwrap_or_default();
            (RepoSlug::new(owner, String::new()), None)
        }
    };
    let branch = Branch::new(client.clone(), slug, payload.ref_name).with_sha(payload.sha);
    match git_url {
        Some(url) if !url.is_empty() => branch.with_git_url(url),
        _ => branch,
    }
}

impl PullRequest {
    pub fn new(client: Client, repo: RepoSlug, number: u64) -> Self {
        Self {
            client,
            repo,
            number,
            summary: Lazy::unloaded(),
            details: Lazy::unloaded(),
        }
    }

    pub(crate) fn from_summary(client: Client, repo: RepoSlug, payload: PullSummaryPayload) -> Self {
        Self {
            client,
            repo,
            number: payload.number,
            summary: Lazy::loaded(PullSummary {
                title: payload.title,
                body: payload.body.unwrap_or_default(),
            }),
            details: Lazy::unloaded(),
        }
    }

    pub(crate) fn from_payload(client: Client, repo: RepoSlug, payload: PullPayload) -> Self {
        let number = payload.number;
        let (summary, details) = split_payload(&client, payload);
        Self {
            client,
            repo,
            number,
            summary: Lazy::loaded(summary),
            details: Lazy::loaded(details),
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    pub async fn summary(&mut self) -> Result<&PullSummary, ApiError> {
        // The summary is only ever unloaded together with the details, so
        // the one fetch fills both.
        let details = &mut self.details;
        let fetch = fetch_pull(&self.client, &self.repo, self.number);
        let client = &self.client;
        self.summary
            .get_or_try_load(|| async move {
                let (summary, loaded) = split_payload(client, fetch.await?);
                *details = Lazy::loaded(loaded);
                Ok(summary)
            })
            .await
    }

    pub async fn details(&mut self) -> Result<&PullDetails, ApiError> {
        let summary = &mut self.summary;
        let fetch = fetch_pull(&self.client, &self.repo, self.number);
        let client = &self.client;
        self.details
            .get_or_try_load(|| async move {
                let (fetched, loaded) = split_payload(client, fetch.await?);
                if !summary.is_loaded() {
                    *summary = Lazy::loaded(fetched);
                }
                Ok(loaded)
            })
            .await
    }

    pub async fn title(&mut self) -> Result<&str, ApiError> {
        Ok(self.summary().await?.title.as_str())
    }

    pub async fn body(&mut self) -> Result<&str, ApiError> {
        Ok(self.summary().await?.body.as_str())
    }

    pub async fn created_at(&mut self) -> Result<&str, ApiError> {
        Ok(self.details().await?.created_at.as_str())
    }

    pub async fn mergeable(&mut self) -> Result<Option<bool>, ApiError> {
        Ok(self.details().await?.mergeable)
    }

    pub async fn head(&mut self) -> Result<&Branch, ApiError> {
        Ok(&self.details().await?.head)
    }

    pub async fn base(&mut self) -> Result<&Branch, ApiError> {
        Ok(&self.details().await?.base)
    }

    /// Issue comments, in the order they were posted.
    #[instrument(skip(self), fields(repo = %self.repo, pr = self.number))]
    pub async fn comments(&self) -> Result<Vec<Comment>, ApiError> {
        let id = self.number.to_string();
        let value = self
            .client
            .get(
                "/repos/{user}/{repo}/issues/{id}/comments",
                &[
                    ("user", self.repo.owner.as_str()),
                    ("repo", self.repo.name.as_str()),
                    ("id", id.as_str()),
                ],
            )
            .await?;
        let payloads: Vec<CommentPayload> = decode(value)?;
        Ok(payloads
            .into_iter()
            .map(|c| Comment {
                author: c.user.login,
                body: c.body,
            })
            .collect())
    }

    /// Ask the host to merge this pull request.
    ///
    /// A refusal (405 not mergeable, 409 head moved) is an outcome, not an
    /// error.
    #[instrument(skip(self, credentials), fields(repo = %self.repo, pr = self.number))]
    pub async fn merge(&self, credentials: &Credentials) -> Result<MergeOutcome, ApiError> {
        let id = self.number.to_string();
        let result = self
            .client
            .put(
                "/repos/{user}/{repo}/pulls/{id}/merge",
                &[
                    ("user", self.repo.owner.as_str()),
                    ("repo", self.repo.name.as_str()),
                    ("id", id.as_str()),
                ],
                Some(json!({})),
                Some(credentials),
            )
            .await;

        match result {
            Ok(value) => {
                let payload: MergePayload = decode(value)?;
                let message = payload.message.unwrap_or_default();
                match payload.sha {
                    Some(sha) if payload.merged => Ok(MergeOutcome::Merged { sha, message }),
                    _ => Ok(MergeOutcome::Rejected { message }),
                }
            }
            Err(err @ ApiError::Remote { status: 405 | 409, .. }) => {
                let message = err.remote_message().unwrap_or_else(|| err.to_string());
                debug!(%message, "merge refused");
                Ok(MergeOutcome::Rejected { message })
            }
            Err(err) => Err(err),
        }
    }
}
