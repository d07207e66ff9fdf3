//! Contains definitions of common types (repository, pull request, commit) needed
//! for working with (GitHub) repositories.
use std::fmt::{Debug, Display, Formatter};

pub mod api;
pub mod response;
pub mod server;
pub mod webhook;

pub use webhook::WebhookSecret;

/// Unique identifier of a GitHub repository
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct GithubRepoName {
    owner: String,
    name: String,
}

impl GithubRepoName {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_lowercase(),
            name: name.to_lowercase(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for GithubRepoName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.owner, self.name))
    }
}

/// A remote repository together with the URL it can be cloned from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Repository {
    pub name: GithubRepoName,
    pub clone_url: String,
}

impl Repository {
    pub fn new(owner: &str, name: &str, clone_url: &str) -> Self {
        Self {
            name: GithubRepoName::new(owner, name),
            clone_url: clone_url.to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        self.name.owner()
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSha(pub String);

impl From<String> for CommitSha {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl From<&str> for CommitSha {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl Display for CommitSha {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub name: String,
    pub sha: CommitSha,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PullRequest {
    pub number: PullRequestNumber,
    pub head: Branch,
    pub base: Branch,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Commit {
    pub sha: CommitSha,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PullRequestNumber(pub u64);

impl From<u64> for PullRequestNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for PullRequestNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <u64 as Display>::fmt(&self.0, f)
    }
}

/// The minimal identity needed to look up a pull request.
#[derive(Clone, Debug, PartialEq)]
pub struct Issue {
    pub number: PullRequestNumber,
    pub repository: Repository,
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository.name, self.number)
    }
}
