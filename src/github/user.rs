use tracing::{debug, instrument};

use super::types::{decode, RepoPayload, UserPayload};
use super::{Client, Lazy, Repository};
use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct UserDetails {
    pub name: Option<String>,
    pub following: u64,
}

pub struct User {
    client: Client,
    username: String,
    details: Lazy<UserDetails>,
}

impl User {
    pub fn new(client: Client, username: impl Into<String>) -> Self {
        Self {
            client,
            username: username.into(),
            details: Lazy::unloaded(),
        }
    }

    pub fn with_details(client: Client, username: impl Into<String>, details: UserDetails) -> Self {
        Self {
            client,
            username: username.into(),
            details: Lazy::loaded(details),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn details(&mut self) -> Result<&UserDetails, ApiError> {
        let (client, username) = (&self.client, &self.username);
        self.details
            .get_or_try_load(|| async move {
                debug!(user = %username, "loading user details");
                let value = client.get("/users/{user}", &[("user", username.as_str())]).await?;
                let payload: UserPayload = decode(value)?;
                Ok(UserDetails {
                    name: payload.name,
                    following: payload.following,
                })
            })
            .await
    }

    /// Display name, when the user has set one.
    pub async fn name(&mut self) -> Result<Option<&str>, ApiError> {
        Ok(self.details().await?.name.as_deref())
    }

    pub async fn following(&mut self) -> Result<u64, ApiError> {
        Ok(self.details().await?.following)
    }

    #[instrument(skip(self), fields(user = %self.username))]
    pub async fn repositories(&self) -> Result<Vec<Repository>, ApiError> {
        let value = self
            .client
            .get("/users/{user}/repos", &[("user", self.username.as_str())])
            .await?;
        let payloads: Vec<RepoPayload> = decode(value)?;
        debug!(count = payloads.len(), "listed repositories");

        Ok(payloads
            .iter()
            .map(|p| Repository::from_payload(self.client.clone(), p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::FakeRest;
    use crate::github::tests::repo_json;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_user_details_loaded_once() {
        let fake = Arc::new(FakeRest::new().respond(
            "GET",
            "/users/alice",
            json!({"login": "alice", "name": "Alice Liddell", "following": 12}),
        ));
        let mut user = User::new(fake.clone(), "alice");

        assert_eq!(user.name().await.unwrap(), Some("Alice Liddell"));
        assert_eq!(user.following().await.unwrap(), 12);
        assert_eq!(fake.call_count("GET", "/users/alice"), 1);
    }

    #[tokio::test]
    async fn test_user_without_display_name() {
        let fake = Arc::new(FakeRest::new().respond(
            "GET",
            "/users/bob",
            json!({"login": "bob", "name": null, "following": 0}),
        ));
        let mut user = User::new(fake, "bob");
        assert_eq!(user.name().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_repositories_are_preloaded() {
        let fake = Arc::new(FakeRest::new().respond(
            "GET",
            "/users/alice/repos",
            json!([repo_json("alice", "gizz"), repo_json("alice", "dotfiles")]),
        ));
        let user = User::new(fake.clone(), "alice");
        let mut repos = user.repositories().await.unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["gizz", "dotfiles"]);
        assert_eq!(
            repos[1].git_url().await.unwrap(),
            "https://github.com/alice/dotfiles.git"
        );
        assert_eq!(fake.calls().len(), 1);
    }
}
