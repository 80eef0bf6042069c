use std::io::Write;
use tracing::{info, instrument};

use super::{parse_repo_arg, Context};
use crate::error::{GizzError, Result};
use crate::git::github_remote;
use crate::github::Repository;

/// Fork `--repo`, or the repository behind `origin`. Unless `--repo` or
/// `--no-add` was given, the fork is added as a remote named after the user.
#[instrument(skip(ctx, out))]
pub async fn fork(
    ctx: &Context,
    repo_arg: Option<&str>,
    no_add: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let slug = match repo_arg {
        Some(arg) => parse_repo_arg(arg)?,
        None => github_remote(&ctx.remotes().await?, "origin").ok_or_else(|| {
            GizzError::InvalidRepository("origin is not a GitHub repository".to_string())
        })?,
    };

    let credentials = ctx.auth.credentials()?;
    if slug.owner == credentials.username() {
        return Err(GizzError::InvalidRepository(format!(
            "{} already belongs to {}",
            slug,
            credentials.username()
        )));
    }

    let source = Repository::new(ctx.client.clone(), slug);
    let mut forked = source.fork(&credentials).await?;
    writeln!(out, "Forked {} to {}", source.slug(), forked.slug())?;

    if repo_arg.is_none() && !no_add {
        let remote = credentials.username();
        let url = forked.ssh_url().await?.to_string();
        ctx.git.run(&["remote", "add", remote, url.as_str()]).await?;
        info!(%remote, %url, "added fork as remote");
        writeln!(out, "Added remote {} ({})", remote, url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::FakeRest;
    use crate::commands::tests::{context, output};
    use crate::git::tests::FakeGit;
    use crate::github::tests::repo_json;
    use std::sync::Arc;

    fn forking(owner: &str) -> Arc<FakeRest> {
        Arc::new(FakeRest::new().respond(
            "POST",
            &format!("/repos/{}/gizz/forks", owner),
            repo_json("carol", "gizz"),
        ))
    }

    #[tokio::test]
    async fn test_fork_origin_adds_remote() {
        let dir = tempfile::tempdir().unwrap();
        let rest = forking("alice");
        let git = Arc::new(FakeGit::new().with_remote("origin", "git://github.com/alice/gizz.git"));
        let ctx = context(rest.clone(), git.clone(), Some("carol"), &dir);

        let mut out = Vec::new();
        fork(&ctx, None, false, &mut out).await.unwrap();

        assert!(output(out).starts_with("Forked alice/gizz to carol/gizz\n"));
        assert_eq!(
            git.remote_url("carol").as_deref(),
            Some("git@github.com:carol/gizz.git")
        );
        assert!(rest.calls()[0].authenticated);
    }

    #[tokio::test]
    async fn test_no_add_skips_remote() {
        let dir = tempfile::tempdir().unwrap();
        let git = Arc::new(FakeGit::new().with_remote("origin", "git://github.com/alice/gizz.git"));
        let ctx = context(forking("alice"), git.clone(), Some("carol"), &dir);

        fork(&ctx, None, true, &mut Vec::new()).await.unwrap();

        assert!(git.remote_url("carol").is_none());
    }

    #[tokio::test]
    async fn test_explicit_repo_skips_remote() {
        let dir = tempfile::tempdir().unwrap();
        let git = Arc::new(FakeGit::new());
        let ctx = context(forking("dave"), git.clone(), Some("carol"), &dir);

        fork(&ctx, Some("dave/gizz"), false, &mut Vec::new()).await.unwrap();

        assert!(git.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_own_repository_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new());
        let ctx = context(rest.clone(), FakeGit::new(), Some("carol"), &dir);

        let err = fork(&ctx, Some("carol/gizz"), false, &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GizzError::InvalidRepository(_)));
        assert!(rest.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fork_needs_username() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(forking("alice"), FakeGit::new(), None, &dir);
        let err = fork(&ctx, Some("alice/gizz"), false, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GizzError::UnknownUser));
    }
}
