pub mod remotes;

pub use remotes::{current_branch, github_remote, parse_github_url, parse_remotes, Remote};

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("`git {args}` failed ({})", describe_exit(.exit_code))]
    Command {
        args: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// The local git executable.
///
/// Neither primitive interprets output; callers parse what `capture`
/// returns.
#[async_trait]
pub trait GitGateway: Send + Sync {
    /// Run git, discarding its output.
    async fn run(&self, args: &[&str]) -> Result<(), GitError>;

    /// Run git and return its stdout.
    async fn capture(&self, args: &[&str]) -> Result<String, GitError>;
}

/// `GitGateway` that shells out to `git` in the current directory.
#[derive(Debug, Default)]
pub struct SystemGit;

impl SystemGit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitGateway for SystemGit {
    #[instrument(skip(self))]
    async fn run(&self, args: &[&str]) -> Result<(), GitError> {
        let status = Command::new("git")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        debug!(code = ?status.code(), "git finished");

        if !status.success() {
            return Err(GitError::Command {
                args: args.join(" "),
                exit_code: status.code(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn capture(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await?;
        debug!(code = ?output.status.code(), bytes = output.stdout.len(), "git finished");

        if !output.status.success() {
            return Err(GitError::Command {
                args: args.join(" "),
                exit_code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
