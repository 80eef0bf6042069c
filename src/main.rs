use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use gizz::api::HttpClient;
use gizz::auth::CredentialProvider;
use gizz::commands::list::ListPullsArgs;
use gizz::commands::pulls::RequestPullArgs;
use gizz::commands::{fork, list, pulls, whoami, Context};
use gizz::config::Config;
use gizz::error::{user_message, Result};
use gizz::git::SystemGit;

/// gizz: command-line interface to GitHub pull requests.
#[derive(Parser, Debug)]
#[command(name = "gizz", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the repositories of a user
    ListRepos {
        /// User to list (default: you)
        user: Option<String>,
    },

    /// List the branches of a repository
    ListBranches {
        /// Repository as OWNER/REPO
        #[arg(long)]
        repo: Option<String>,
    },

    /// List the tags of a repository
    ListTags {
        #[arg(long)]
        repo: Option<String>,
    },

    /// Fork a repository
    Fork {
        #[arg(long)]
        repo: Option<String>,

        /// Don't add the new repository as a remote
        #[arg(short = 'n', long)]
        no_add: bool,
    },

    /// List the pull requests of a repository
    ListPr {
        #[arg(long)]
        repo: Option<String>,

        /// Show only pull request #id
        id: Option<u64>,

        /// More details
        #[arg(short, long)]
        verbose: bool,

        /// Include closed pull requests
        #[arg(long)]
        closed: bool,

        /// Show comments
        #[arg(short, long)]
        comments: bool,
    },

    /// Fetch pull requests into local branches
    FetchPr {
        #[arg(long)]
        repo: Option<String>,

        /// Fetch only pull request #id
        id: Option<u64>,

        /// Merge the pull request on GitHub instead
        #[arg(short, long)]
        merge: bool,
    },

    /// Create a pull request on GitHub
    RequestPull {
        /// Send the request to OWNER/REPO
        #[arg(short, long)]
        repo: Option<String>,

        /// Remote branch to merge into
        #[arg(short, long, default_value = "master")]
        base: String,

        /// Local branch (default: current branch)
        #[arg(short = 'e', long)]
        head: Option<String>,

        /// Don't push the branch first
        #[arg(short = 'p', long)]
        no_push: bool,

        /// Don't fork the parent repository
        #[arg(short = 'f', long)]
        no_fork: bool,
    },

    /// Show or set your GitHub username
    Whoami {
        user: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("{}", user_message(&err).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::load()?;
    let client = Arc::new(HttpClient::new(config.api_url()));
    let auth = CredentialProvider::from_config(config)?;
    let ctx = Context::new(client, Arc::new(SystemGit::new()), auth);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::ListRepos { user } => {
            list::list_repos(&ctx, user.as_deref(), &mut out)
                .instrument(info_span!("list_repos"))
                .await
        }
        Command::ListBranches { repo } => {
            list::list_branches(&ctx, repo.as_deref(), &mut out)
                .instrument(info_span!("list_branches"))
                .await
        }
        Command::ListTags { repo } => {
            list::list_tags(&ctx, repo.as_deref(), &mut out)
                .instrument(info_span!("list_tags"))
                .await
        }
        Command::Fork { repo, no_add } => {
            fork::fork(&ctx, repo.as_deref(), no_add, &mut out)
                .instrument(info_span!("fork"))
                .await
        }
        Command::ListPr {
            repo,
            id,
            verbose,
            closed,
            comments,
        } => {
            let args = ListPullsArgs {
                repo,
                id,
                verbose,
                closed,
                comments,
            };
            list::list_pull_requests(&ctx, &args, &mut out)
                .instrument(info_span!("list_pr"))
                .await
        }
        Command::FetchPr { repo, id, merge } => {
            pulls::fetch_pr(&ctx, repo.as_deref(), id, merge, &mut out)
                .instrument(info_span!("fetch_pr"))
                .await
        }
        Command::RequestPull {
            repo,
            base,
            head,
            no_push,
            no_fork,
        } => {
            let args = RequestPullArgs {
                repo,
                base,
                head,
                no_push,
                no_fork,
            };
            pulls::request_pull(&ctx, &args, &mut out)
                .instrument(info_span!("request_pull"))
                .await
        }
        Command::Whoami { user } => {
            whoami::whoami(&ctx, user.as_deref(), &mut out)
                .instrument(info_span!("whoami"))
                .await
        }
    }
}
