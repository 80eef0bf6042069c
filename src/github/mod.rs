pub mod branch;
pub mod pull_request;
pub mod repository;
pub mod types;
pub mod user;

pub use branch::{Branch, Tag};
pub use pull_request::{Comment, MergeOutcome, PullRequest};
pub use repository::Repository;
pub use user::User;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::RestClient;

/// Shared handle every entity uses to reach the API.
pub type Client = Arc<dyn RestClient>;

/// A field set that is either not fetched yet or fetched exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Lazy<T>(Option<T>);

impl<T> Lazy<T> {
    pub fn unloaded() -> Self {
        Self(None)
    }

    pub fn loaded(value: T) -> Self {
        Self(Some(value))
    }

    pub fn is_loaded(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Return the loaded value, running `load` first if nothing is loaded.
    ///
    /// `load` runs at most once over the life of the value; a failed load
    /// leaves it unloaded.
    pub async fn get_or_try_load<F, Fut, E>(&mut self, load: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = match self.0.take() {
            Some(value) => value,
            None => load().await?,
        };
        Ok(self.0.insert(value))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("expected OWNER/REPO, got `{0}`")]
pub struct ParseSlugError(pub String);

/// The `owner/name` pair that identifies a repository on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = ParseSlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoSlug::new(owner, name))
            }
            _ => Err(ParseSlugError(s.to_string())),
        }
    }
}
