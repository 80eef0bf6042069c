//! Parsers for `git remote -v show` and `git branch` output.

use crate::github::RepoSlug;

const GITHUB_PREFIXES: [&str; 5] = [
    "git://github.com/",
    "git@github.com:",
    "https://github.com/",
    "http://github.com/",
    "ssh://git@github.com/",
];

/// One line of `git remote -v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
    /// `fetch` or `push`.
    pub direction: String,
}

/// Parse `git remote -v show` output. Lines that don't have the
/// `name url (direction)` shape are skipped.
pub fn parse_remotes(output: &str) -> Vec<Remote> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let url = fields.next()?;
            let direction = fields
                .next()
                .map(|d| d.trim_start_matches('(').trim_end_matches(')'))
                .unwrap_or("fetch");
            Some(Remote {
                name: name.to_string(),
                url: url.to_string(),
                direction: direction.to_string(),
            })
        })
        .collect()
}

/// Extract `owner/name` from a GitHub remote URL.
pub fn parse_github_url(url: &str) -> Option<RepoSlug> {
    let path = GITHUB_PREFIXES
        .iter()
        .find_map(|prefix| url.trim().strip_prefix(prefix))?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(RepoSlug::new(owner, name))
}

/// The GitHub repository behind the remote called `remote_name`, if it
/// exists and points at GitHub.
pub fn github_remote(remotes: &[Remote], remote_name: &str) -> Option<RepoSlug> {
    remotes
        .iter()
        .filter(|r| r.name == remote_name)
        .find_map(|r| parse_github_url(&r.url))
}

/// The checked-out branch from `git branch` output; None on a detached
/// HEAD or before the first commit.
pub fn current_branch(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("* "))
        .map(str::trim)
        .filter(|name| !name.starts_with('('))
        .map(str::to_string)
}
