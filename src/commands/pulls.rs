//! `fetch-pr` and `request-pull`.

use std::io::Write;
use tracing::{debug, info, instrument};

use super::{parse_repo_arg, Context};
use crate::auth::Credentials;
use crate::editor::{edit_titled_message, TitledMessage};
use crate::error::{GizzError, Result};
use crate::fetch::{fetch_pull_request, fetch_pull_requests};
use crate::git::{current_branch, github_remote};
use crate::github::{Branch, MergeOutcome, RepoSlug, Repository};

/// Fetch one pull request, or every open one, into local branches. With
/// `merge`, ask the host to merge the given pull request instead.
#[instrument(skip(ctx, out))]
pub async fn fetch_pr(
    ctx: &Context,
    repo_arg: Option<&str>,
    id: Option<u64>,
    merge: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if merge && id.is_none() {
        return Err(GizzError::InvalidArgument(
            "--merge requires a specific id".to_string(),
        ));
    }

    let slug = ctx.resolve_repo(repo_arg).await?;
    let repo = Repository::new(ctx.client.clone(), slug);

    let Some(id) = id else {
        let mut pulls = repo.pull_requests(false).await?;
        fetch_pull_requests(&mut pulls, ctx.git.as_ref(), |number, result| {
            match result {
                Ok(fetched) => {
                    for line in fetched.summary() {
                        writeln!(out, "{}", line)?;
                    }
                }
                Err(err) => writeln!(out, "Pull request #{}: {}", number, err)?,
            }
            out.flush()
        })
        .await?;
        return Ok(());
    };

    if merge {
        let credentials = ctx.auth.credentials()?;
        let mut pr = repo.pull_request(id).await?;
        match pr.merge(&credentials).await? {
            MergeOutcome::Merged { sha, message } => {
                writeln!(out, "{}", message)?;
                writeln!(out, "{} is now at {}", pr.head().await?.name(), sha)?;
            }
            MergeOutcome::Rejected { message } => writeln!(out, "{}", message)?,
        }
        return Ok(());
    }

    let mut pr = repo.pull_request(id).await?;
    let fetched = fetch_pull_request(&mut pr, ctx.git.as_ref()).await?;
    for line in fetched.summary() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RequestPullArgs {
    pub repo: Option<String>,
    pub base: String,
    pub head: Option<String>,
    pub no_push: bool,
    pub no_fork: bool,
}

impl Default for RequestPullArgs {
    fn default() -> Self {
        Self {
            repo: None,
            base: "master".to_string(),
            head: None,
            no_push: false,
            no_fork: false,
        }
    }
}

/// Where the head repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRepo {
    Existing(RepoSlug),
    /// Fork the base into the user's account and add it as a remote.
    Fork,
}

/// Which repositories a pull request goes between, decided from the local
/// remotes alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    pub head: HeadRepo,
    /// None means the parent of the head repository.
    pub base: Option<RepoSlug>,
    pub push_remote: String,
}

/// Decide the head and base repositories.
///
/// - `origin` owned by the user: it is the head; the base is `--repo` or
///   its parent.
/// - no remote named after the user: the base is `--repo` or `origin`, and
///   it gets forked.
/// - a remote named after the user, owned by the user: it is the head; the
///   base is `--repo` or `origin`.
pub fn plan_request(
    username: &str,
    origin: Option<RepoSlug>,
    user_remote: Option<RepoSlug>,
    repo_arg: Option<RepoSlug>,
    no_fork: bool,
) -> Result<RequestPlan> {
    if let Some(origin) = origin.as_ref().filter(|o| o.owner == username) {
        return Ok(RequestPlan {
            head: HeadRepo::Existing(origin.clone()),
            base: repo_arg,
            push_remote: "origin".to_string(),
        });
    }

    let base = repo_arg.or(origin).ok_or_else(|| {
        GizzError::InvalidRepository("no GitHub remote found; pass --repo OWNER/REPO".to_string())
    })?;

    match user_remote {
        None if no_fork => Err(GizzError::ForkNeeded),
        None => Ok(RequestPlan {
            head: HeadRepo::Fork,
            base: Some(base),
            push_remote: username.to_string(),
        }),
        Some(remote) if remote.owner == username => Ok(RequestPlan {
            head: HeadRepo::Existing(remote),
            base: Some(base),
            push_remote: username.to_string(),
        }),
        Some(remote) => Err(GizzError::InvalidRepository(format!(
            "remote {} points at {}, which {} does not own",
            username, remote, username
        ))),
    }
}

/// A pull request ready for its title and body.
#[derive(Debug)]
pub struct PreparedPull {
    pub head: RepoSlug,
    pub head_branch: String,
    pub base: RepoSlug,
    pub base_branch: String,
    credentials: Credentials,
}

impl PreparedPull {
    /// Lines shown under the editor template.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Head: {}:{}", self.head, self.head_branch),
            format!("Base: {}:{}", self.base, self.base_branch),
        ]
    }
}

/// Resolve the repositories, forking if needed, and push the head branch.
#[instrument(skip(ctx, out))]
pub async fn prepare_pull_request(
    ctx: &Context,
    args: &RequestPullArgs,
    out: &mut dyn Write,
) -> Result<PreparedPull> {
    let head_branch = match &args.head {
        Some(head) => head.clone(),
        None => current_branch(&ctx.git.capture(&["branch"]).await?).ok_or_else(|| {
            GizzError::InvalidArgument("not on a branch; pass --head BRANCH".to_string())
        })?,
    };

    let credentials = ctx.auth.credentials()?;
    let username = credentials.username();
    let repo_arg = args.repo.as_deref().map(parse_repo_arg).transpose()?;
    let remotes = ctx.remotes().await?;
    let plan = plan_request(
        username,
        github_remote(&remotes, "origin"),
        github_remote(&remotes, username),
        repo_arg,
        args.no_fork,
    )?;
    debug!(?plan, "planned pull request");

    let (head, base) = match plan.head {
        HeadRepo::Existing(head) => {
            let base = match plan.base {
                Some(base) => base,
                None => Repository::new(ctx.client.clone(), head.clone())
                    .parent()
                    .await?
                    .map(|parent| parent.slug().clone())
                    .ok_or_else(|| {
                        GizzError::InvalidRepository(format!(
                            "{} is not a fork; pass --repo OWNER/REPO",
                            head
                        ))
                    })?,
            };
            (head, base)
        }
        HeadRepo::Fork => {
            // plan_request always names the base when a fork is needed.
            let base = plan.base.ok_or_else(|| {
                GizzError::InvalidRepository("nothing to fork".to_string())
            })?;
            let mut fork = Repository::new(ctx.client.clone(), base.clone())
                .fork(&credentials)
                .await?;
            writeln!(out, "Forked {} to {}", base, fork.slug())?;
            let url = fork.ssh_url().await?.to_string();
            ctx.git.run(&["remote", "add", username, url.as_str()]).await?;
            info!(remote = %username, %url, "added fork as remote");
            (fork.slug().clone(), base)
        }
    };

    if !args.no_push {
        ctx.git
            .run(&["push", plan.push_remote.as_str(), head_branch.as_str()])
            .await?;
        info!(remote = %plan.push_remote, branch = %head_branch, "pushed");
    }

    Ok(PreparedPull {
        head,
        head_branch,
        base,
        base_branch: args.base.clone(),
        credentials,
    })
}

/// Open the pull request, or report that it was cancelled when there is no
/// message.
#[instrument(skip(ctx, prepared, message, out))]
pub async fn submit_pull_request(
    ctx: &Context,
    prepared: &PreparedPull,
    message: Option<TitledMessage>,
    out: &mut dyn Write,
) -> Result<()> {
    let Some(message) = message else {
        writeln!(out, "Pull request cancelled")?;
        return Ok(());
    };

    let source = Branch::new(ctx.client.clone(), prepared.head.clone(), &prepared.head_branch);
    let target = Branch::new(ctx.client.clone(), prepared.base.clone(), &prepared.base_branch);
    target
        .create_pull_request(&message.title, &message.body, &source, &prepared.credentials)
        .await?;
    writeln!(
        out,
        "Requested pull of {}:{} into {}:{}",
        prepared.head, prepared.head_branch, prepared.base, prepared.base_branch
    )?;
    Ok(())
}

pub async fn request_pull(ctx: &Context, args: &RequestPullArgs, out: &mut dyn Write) -> Result<()> {
    let prepared = prepare_pull_request(ctx, args, out).await?;
    let message = edit_titled_message(&prepared.describe()).await?;
    submit_pull_request(ctx, &prepared, message, out).await
}
