use colored::Colorize;
use std::io::Write;
use tracing::instrument;

use super::Context;
use crate::error::Result;
use crate::github::{PullRequest, Repository, User};

#[instrument(skip(ctx, out))]
pub async fn list_repos(ctx: &Context, user: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let username = match user {
        Some(name) => name.to_string(),
        None => ctx.auth.username()?,
    };
    let user = User::new(ctx.client.clone(), username);
    for repo in user.repositories().await? {
        writeln!(out, "{}", repo.name())?;
    }
    Ok(())
}

#[instrument(skip(ctx, out))]
pub async fn list_branches(ctx: &Context, repo_arg: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let slug = ctx.resolve_repo(repo_arg).await?;
    let repo = Repository::new(ctx.client.clone(), slug);
    for branch in repo.branches().await? {
        writeln!(out, "{}", branch.name())?;
    }
    Ok(())
}

#[instrument(skip(ctx, out))]
pub async fn list_tags(ctx: &Context, repo_arg: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let slug = ctx.resolve_repo(repo_arg).await?;
    let repo = Repository::new(ctx.client.clone(), slug);
    for tag in repo.tags().await? {
        writeln!(out, "{} {}", tag.name, tag.short_sha())?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ListPullsArgs {
    pub repo: Option<String>,
    pub id: Option<u64>,
    pub verbose: bool,
    pub closed: bool,
    pub comments: bool,
}

#[instrument(skip(ctx, out))]
pub async fn list_pull_requests(ctx: &Context, args: &ListPullsArgs, out: &mut dyn Write) -> Result<()> {
    let slug = ctx.resolve_repo(args.repo.as_deref()).await?;
    let repo = Repository::new(ctx.client.clone(), slug);

    if let Some(id) = args.id {
        let mut pr = repo.pull_request(id).await?;
        return print_pull_request(&mut pr, true, args.comments, out).await;
    }

    let mut pulls = repo.pull_requests(args.closed).await?;
    for (i, pr) in pulls.iter_mut().enumerate() {
        if args.verbose && i != 0 {
            writeln!(out, "--")?;
        }
        print_pull_request(pr, args.verbose, args.comments, out).await?;
    }
    Ok(())
}

async fn print_pull_request(
    pr: &mut PullRequest,
    verbose: bool,
    comments: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if verbose {
        let number = pr.number();
        let created_at = pr.created_at().await?.to_string();
        let mergeable = pr.mergeable().await? == Some(true);
        let head = pr.head().await?;
        let from = head.owner().to_string();
        let remote_url = head.git_url().unwrap_or("(repository deleted)").to_string();
        let head_line = format!("{} at {}", head.name(), head.sha().unwrap_or("?"));
        let base = pr.base().await?;
        let base_line = format!("{} at {}", base.name(), base.sha().unwrap_or("?"));
        let title = pr.title().await?.to_string();
        let body = pr.body().await?.trim().to_string();

        writeln!(out, "From: {}", from)?;
        writeln!(out, "Remote URL: {}", remote_url)?;
        writeln!(out, "Date: {}", created_at)?;
        writeln!(out, "Id: {}", number)?;
        writeln!(out, "Subject: {}", title)?;
        writeln!(
            out,
            "Merge {}\n   to {}{}",
            head_line,
            base_line,
            if mergeable {
                format!(" {}", "[auto-mergeable]".green())
            } else {
                String::new()
            }
        )?;
        if !body.is_empty() {
            writeln!(out, "{}", body)?;
        }
    } else {
        let number = pr.number();
        writeln!(out, "{} => {}", number.to_string().bold(), pr.title().await?)?;
    }

    if comments {
        let comments = pr.comments().await?;
        if !comments.is_empty() {
            writeln!(out)?;
        }
        for comment in comments {
            writeln!(out, "Comment from: {}", comment.author)?;
            writeln!(out, "{}", comment.body.trim_end())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::FakeRest;
    use crate::commands::tests::{context, output};
    use crate::git::tests::FakeGit;
    use crate::github::tests::{pull_json, repo_json};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_repos_for_named_user() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new().respond(
            "GET",
            "/users/bob/repos",
            json!([repo_json("bob", "gizz"), repo_json("bob", "notes")]),
        ));
        let ctx = context(rest, FakeGit::new(), Some("alice"), &dir);
        let mut out = Vec::new();
        list_repos(&ctx, Some("bob"), &mut out).await.unwrap();
        assert_eq!(output(out), "gizz\nnotes\n");
    }

    #[tokio::test]
    async fn test_list_repos_defaults_to_configured_user() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new().respond(
            "GET",
            "/users/alice/repos",
            json!([repo_json("alice", "gizz")]),
        ));
        let ctx = context(rest, FakeGit::new(), Some("alice"), &dir);
        let mut out = Vec::new();
        list_repos(&ctx, None, &mut out).await.unwrap();
        assert_eq!(output(out), "gizz\n");
    }

    #[tokio::test]
    async fn test_list_repos_without_user_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(Arc::new(FakeRest::new()), FakeGit::new(), None, &dir);
        let err = list_repos(&ctx, None, &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, crate::error::GizzError::UnknownUser));
    }

    #[tokio::test]
    async fn test_list_tags() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new().respond(
            "GET",
            "/repos/alice/gizz/tags",
            json!([
                {"name": "v0.5", "commit": {"sha": "aaaaaaaaaaaaaaaa"}, "tarball_url": "t1"},
                {"name": "v0.4", "commit": {"sha": "bbbbbbbbbbbbbbbb"}, "tarball_url": "t2"}
            ]),
        ));
        let ctx = context(rest, FakeGit::new(), None, &dir);
        let mut out = Vec::new();
        list_tags(&ctx, Some("alice/gizz"), &mut out).await.unwrap();
        assert_eq!(output(out), "v0.5 aaaaaaaaaa\nv0.4 bbbbbbbbbb\n");
    }

    #[tokio::test]
    async fn test_list_branches_from_origin() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new().respond(
            "GET",
            "/repos/alice/gizz/branches",
            json!([{"name": "master", "commit": {"sha": "a", "url": "u"}}]),
        ));
        let git = FakeGit::new().with_remote("origin", "git@github.com:alice/gizz.git");
        let ctx = context(rest, git, None, &dir);
        let mut out = Vec::new();
        list_branches(&ctx, None, &mut out).await.unwrap();
        assert_eq!(output(out), "master\n");
    }

    #[tokio::test]
    async fn test_list_pull_requests_short() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(FakeRest::new().respond(
            "GET",
            "/repos/alice/gizz/pulls?state=open",
            json!([
                {"number": 7, "title": "Seven", "body": null},
                {"number": 3, "title": "Three", "body": "x"}
            ]),
        ));
        let ctx = context(rest.clone(), FakeGit::new(), None, &dir);
        let mut out = Vec::new();
        let args = ListPullsArgs {
            repo: Some("alice/gizz".to_string()),
            ..Default::default()
        };
        list_pull_requests(&ctx, &args, &mut out).await.unwrap();

        let text = output(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("7") && lines[0].ends_with("=> Seven"));
        assert!(lines[1].ends_with("=> Three"));
        // Listing alone needs no detail fetches.
        assert_eq!(rest.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_show_single_pull_request_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let rest = Arc::new(
            FakeRest::new()
                .respond("GET", "/repos/alice/gizz/pulls/42", pull_json(42, "bob", "feature-x", "master"))
                .respond(
                    "GET",
                    "/repos/alice/gizz/issues/42/comments",
                    json!([{"user": {"login": "carol"}, "body": "Nice\n"}]),
                ),
        );
        let ctx = context(rest, FakeGit::new(), None, &dir);
        let mut out = Vec::new();
        let args = ListPullsArgs {
            repo: Some("alice/gizz".to_string()),
            id: Some(42),
            comments: true,
            ..Default::default()
        };
        list_pull_requests(&ctx, &args, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("From: bob\n"));
        assert!(text.contains("Remote URL: https://github.com/bob/gizz.git\n"));
        assert!(text.contains("Date: 2012-06-01T10:00:00Z\n"));
        assert!(text.contains("Id: 42\n"));
        assert!(text.contains("Subject: PR 42\n"));
        assert!(text.contains("Merge feature-x at headsha\n   to master at basesha"));
        assert!(text.contains("[auto-mergeable]"));
        assert!(text.contains("Please merge\n"));
        assert!(text.ends_with("Comment from: carol\nNice\n"));
    }
}
