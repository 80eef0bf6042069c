use serde_json::json;
use tracing::{debug, instrument};

use super::types::{decode, BranchPayload, PullSummaryPayload, RepoPayload, TagPayload};
use super::{Branch, Client, Lazy, PullRequest, RepoSlug, Tag};
use crate::api::ApiError;
use crate::auth::Credentials;

/// Fields of a repository that come from `GET /repos/{user}/{repo}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryDetails {
    /// Read-only remote URL.
    pub git_url: String,
    /// Push-capable remote URL.
    pub ssh_url: String,
    pub description: Option<String>,
    pub parent: Option<RepoSlug>,
}

impl RepositoryDetails {
    pub(crate) fn from_payload(payload: &RepoPayload) -> Self {
        Self {
            git_url: payload.read_only_url(),
            ssh_url: payload.ssh_url.clone().unwrap_or_default(),
            description: payload.description.clone(),
            parent: payload
                .parent
                .as_ref()
                .map(|p| RepoSlug::new(&p.owner.login, &p.name)),
        }
    }
}

pub struct Repository {
    client: Client,
    slug: RepoSlug,
    details: Lazy<RepositoryDetails>,
}

impl Repository {
    pub fn new(client: Client, slug: RepoSlug) -> Self {
        Self {
            client,
            slug,
            details: Lazy::unloaded(),
        }
    }

    pub fn with_details(client: Client, slug: RepoSlug, details: RepositoryDetails) -> Self {
        Self {
            client,
            slug,
            details: Lazy::loaded(details),
        }
    }

    pub(crate) fn from_payload(client: Client, payload: &RepoPayload) -> Self {
        Self::with_details(client, payload.slug(), RepositoryDetails::from_payload(payload))
    }

    pub fn slug(&self) -> &RepoSlug {
        &self.slug
    }

    pub fn owner(&self) -> &str {
        &self.slug.owner
    }

    pub fn name(&self) -> &str {
        &self.slug.name
    }

    pub async fn details(&mut self) -> Result<&RepositoryDetails, ApiError> {
        let (client, slug) = (&self.client, &self.slug);
        self.details
            .get_or_try_load(|| async move {
                debug!(repo = %slug, "loading repository details");
                let value = client
                    .get(
                        "/repos/{user}/{repo}",
                        &[("user", slug.owner.as_str()), ("repo", slug.name.as_str())],
                    )
                    .await?;
                let payload: RepoPayload = decode(value)?;
                Ok(RepositoryDetails::from_payload(&payload))
            })
            .await
    }

    pub async fn git_url(&mut self) -> Result<&str, ApiError> {
        Ok(self.details().await?.git_url.as_str())
    }

    pub async fn ssh_url(&mut self) -> Result<&str, ApiError> {
        Ok(self.details().await?.ssh_url.as_str())
    }

    pub async fn description(&mut self) -> Result<Option<&str>, ApiError> {
        Ok(self.details().await?.description.as_deref())
    }

    /// The repository this one was forked from, if any.
    pub async fn parent(&mut self) -> Result<Option<Repository>, ApiError> {
        let parent = self.details().await?.parent.clone();
        Ok(parent.map(|slug| Repository::new(self.client.clone(), slug)))
    }

    #[instrument(skip(self), fields(repo = %self.slug))]
    pub async fn branches(&self) -> Result<Vec<Branch>, ApiError> {
        let value = self
            .client
            .get(
                "/repos/{user}/{repo}/branches",
                &[("user", self.slug.owner.as_str()), ("repo", self.slug.name.as_str())],
            )
            .await?;
        let payloads: Vec<BranchPayload> = decode(value)?;
        debug!(count = payloads.len(), "listed branches");

        Ok(payloads
            .into_iter()
            .map(|b| {
                Branch::new(self.client.clone(), self.slug.clone(), b.name).with_sha(b.commit.sha)
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = %self.slug))]
    pub async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        let value = self
            .client
            .get(
                "/repos/{user}/{repo}/tags",
                &[("user", self.slug.owner.as_str()), ("repo", self.slug.name.as_str())],
            )
            .await?;
        let payloads: Vec<TagPayload> = decode(value)?;
        debug!(count = payloads.len(), "listed tags");

        Ok(payloads
            .into_iter()
            .map(|t| Tag {
                repo: self.slug.clone(),
                name: t.name,
                sha: t.commit.sha,
                tarball_url: t.tarball_url,
            })
            .collect())
    }

    /// Open pull requests, or all of them when `include_closed` is set,
    /// in the order the API returns them.
    #[instrument(skip(self), fields(repo = %self.slug))]
    pub async fn pull_requests(&self, include_closed: bool) -> Result<Vec<PullRequest>, ApiError> {
        let state = if include_closed { "all" } else { "open" };
        let value = self
            .client
            .get(
                "/repos/{user}/{repo}/pulls?state={state}",
                &[
                    ("user", self.slug.owner.as_str()),
                    ("repo", self.slug.name.as_str()),
                    ("state", state),
                ],
            )
            .await?;
        let payloads: Vec<PullSummaryPayload> = decode(value)?;
        debug!(count = payloads.len(), "listed pull requests");

        Ok(payloads
            .into_iter()
            .map(|p| PullRequest::from_summary(self.client.clone(), self.slug.clone(), p))
            .collect())
    }

    /// A single pull request with its details already loaded.
    #[instrument(skip(self), fields(repo = %self.slug))]
    pub async fn pull_request(&self, number: u64) -> Result<PullRequest, ApiError> {
        let payload =
            super::pull_request::fetch_pull(&self.client, &self.slug, number).await?;
        Ok(PullRequest::from_payload(self.client.clone(), self.slug.clone(), payload))
    }

    /// Fork this repository into the account the credentials belong to.
    #[instrument(skip(self, credentials), fields(repo = %self.slug, user = credentials.username()))]
    pub async fn fork(&self, credentials: &Credentials) -> Result<Repository, ApiError> {
        let value = self
            .client
            .post(
                "/repos/{user}/{repo}/forks",
                &[("user", self.slug.owner.as_str()), ("repo", self.slug.name.as_str())],
                Some(json!({})),
                Some(credentials),
            )
            .await?;
        let payload: RepoPayload = decode(value)?;

        let mut details = RepositoryDetails::from_payload(&payload);
        if details.parent.is_none() {
            details.parent = Some(self.slug.clone());
        }
        let slug = RepoSlug::new(credentials.username(), &self.slug.name);
        debug!(fork = %slug, "created fork");

        Ok(Repository::with_details(self.client.clone(), slug, details))
    }
}
