//! Bring a pull request's head into the local repository as a branch.
//!
//! Per pull request: register the head owner's fork as a remote (an
//! existing remote of that name is reused), fetch it, then create a local
//! branch tracking `<owner>/<branch>`. If the branch name is taken, one
//! alternate name, `<owner>-<branch>`, is tried before giving up.

use thiserror::Error;
use tracing::{info, info_span, instrument, warn, Instrument};

use crate::api::ApiError;
use crate::git::{GitError, GitGateway};
use crate::github::PullRequest;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("{0} already exists!")]
    BranchExists(String),

    #[error("The head repository of pull request #{0} no longer exists")]
    HeadRepositoryGone(u64),
}

/// What a successful fetch created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBranch {
    pub number: u64,
    /// The local branch actually created.
    pub local_branch: String,
    pub head_owner: String,
    pub head_branch: String,
    pub base_branch: String,
}

impl FetchedBranch {
    pub fn summary(&self) -> [String; 2] {
        [
            format!(
                "Created branch {} tracking {}/{}",
                self.local_branch, self.head_owner, self.head_branch
            ),
            format!("Merge {} into {}", self.local_branch, self.base_branch),
        ]
    }
}

/// The name tried when the head branch name is already taken locally.
pub fn alternate_branch_name(owner: &str, branch: &str) -> String {
    format!("{}-{}", owner, branch)
}

#[instrument(skip(pr, git), fields(pr = pr.number()))]
pub async fn fetch_pull_request(
    pr: &mut PullRequest,
    git: &dyn GitGateway,
) -> Result<FetchedBranch, FetchError> {
    let number = pr.number();
    let base_branch = pr.base().await?.name().to_string();
    let head = pr.head().await?;
    let head_owner = head.owner().to_string();
    let head_branch = head.name().to_string();
    let head_url = head
        .git_url()
        .ok_or(FetchError::HeadRepositoryGone(number))?
        .to_string();

    ensure_remote(git, &head_owner, &head_url).await?;

    info!(remote = %head_owner, "fetching");
    git.run(&["fetch", head_owner.as_str()]).await?;

    let local_branch = create_tracking_branch(git, &head_owner, &head_branch).await?;

    Ok(FetchedBranch {
        number,
        local_branch,
        head_owner,
        head_branch,
        base_branch,
    })
}

/// Fetch each pull request in order, handing every outcome to `report` as
/// soon as that pull request is done. One failure does not stop the rest;
/// only an error from `report` does.
pub async fn fetch_pull_requests<F, E>(
    prs: &mut [PullRequest],
    git: &dyn GitGateway,
    mut report: F,
) -> Result<(), E>
where
    F: FnMut(u64, Result<FetchedBranch, FetchError>) -> Result<(), E>,
{
    for pr in prs.iter_mut() {
        let number = pr.number();
        let result = fetch_pull_request(pr, git)
            .instrument(info_span!("batch_fetch", pr = number))
            .await;
        if let Err(err) = &result {
            warn!(pr = number, error = %err, "fetch failed, continuing");
        }
        report(number, result)?;
    }
    Ok(())
}

/// `git remote add`; a remote that already exists under this name is
/// assumed to point at the right repository.
async fn ensure_remote(git: &dyn GitGateway, name: &str, url: &str) -> Result<(), GitError> {
    match git.run(&["remote", "add", name, url]).await {
        Ok(()) => {
            info!(remote = %name, %url, "added remote");
            Ok(())
        }
        Err(err @ GitError::Command { .. }) => {
            warn!(remote = %name, error = %err, "remote not added, assuming it exists");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

async fn create_tracking_branch(
    git: &dyn GitGateway,
    owner: &str,
    branch: &str,
) -> Result<String, FetchError> {
    let start = format!("{}/{}", owner, branch);

    let candidates = [branch.to_string(), alternate_branch_name(owner, branch)];
    for name in candidates {
        match git.run(&["branch", name.as_str(), start.as_str()]).await {
            Ok(()) => {
                info!(branch = %name, tracking = %start, "created branch");
                return Ok(name);
            }
            Err(GitError::Command { .. }) => {
                warn!(branch = %name, "branch name taken");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(FetchError::BranchExists(branch.to_string()))
}
