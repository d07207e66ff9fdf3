use anyhow::Context;
use axum::async_trait;
use octocrab::Octocrab;

use crate::github::{Branch, Commit, CommitSha, GithubRepoName, PullRequest, PullRequestNumber};
use crate::review::{CommitStatus, RepositoryClient};

/// Number of commits requested per page. GitHub does not allow more than 100.
const COMMITS_PER_PAGE: usize = 100;

/// Provides access to repositories using the GitHub API.
pub struct GithubClient {
    client: Octocrab,
}

impl GithubClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[derive(serde::Deserialize, Debug)]
struct CommitPayload {
    sha: String,
    commit: CommitDetails,
}

#[derive(serde::Deserialize, Debug)]
struct CommitDetails {
    message: String,
}

#[derive(serde::Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(serde::Serialize)]
struct StatusPayload<'a> {
    state: &'a str,
    description: &'a str,
    context: &'a str,
}

#[async_trait]
impl RepositoryClient for GithubClient {
    async fn get_pull_request(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<PullRequest> {
        let pr = self
            .client
            .pulls(repo.owner(), repo.name())
            .get(pr.0)
            .await
            .map_err(|error| anyhow::anyhow!("Could not get PR {repo}#{pr}: {error:?}"))?;
        Ok(github_pr_to_pr(pr))
    }

    async fn get_pull_request_commits(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<Vec<Commit>> {
        // https://docs.github.com/en/rest/pulls/pulls?apiVersion=2022-11-28#list-commits-on-a-pull-request
        let route = format!("/repos/{}/{}/pulls/{pr}/commits", repo.owner(), repo.name());
        let mut commits = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: COMMITS_PER_PAGE,
                page,
            };
            let payload: Vec<CommitPayload> = self
                .client
                .get(&route, Some(&params))
                .await
                .with_context(|| format!("Cannot list commits of {repo}#{pr}"))?;
            let last_page = payload.len() < COMMITS_PER_PAGE;
            commits.extend(payload.into_iter().map(|commit| Commit {
                sha: CommitSha(commit.sha),
                message: commit.commit.message,
            }));
            if last_page {
                break;
            }
        }
        Ok(commits)
    }

    async fn create_status(
        &self,
        repo: &GithubRepoName,
        sha: &CommitSha,
        status: &CommitStatus,
    ) -> anyhow::Result<()> {
        // https://docs.github.com/en/rest/commits/statuses?apiVersion=2022-11-28#create-a-commit-status
        let route = format!("/repos/{}/{}/statuses/{sha}", repo.owner(), repo.name());
        let payload = StatusPayload {
            state: status.state.as_str(),
            description: &status.description,
            context: status.context.as_str(),
        };
        let _: serde_json::Value = self
            .client
            .post(route, Some(&payload))
            .await
            .with_context(|| format!("Cannot create {} status on {repo}@{sha}", status.context))?;
        Ok(())
    }
}

fn github_pr_to_pr(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number.into(),
        head: Branch {
            name: pr.head.ref_field,
            sha: pr.head.sha.into(),
        },
        base: Branch {
            name: pr.base.ref_field,
            sha: pr.base.sha.into(),
        },
    }
}
