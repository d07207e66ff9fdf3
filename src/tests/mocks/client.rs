use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::async_trait;

use super::{default_pr, default_repo};
use crate::github::{Commit, CommitSha, GithubRepoName, PullRequest, PullRequestNumber};
use crate::review::{CommitStatus, RepositoryClient};

/// In-memory remote platform.
pub struct TestRepositoryClient {
    prs: Mutex<HashMap<(GithubRepoName, PullRequestNumber), PullRequest>>,
    commits: Mutex<Vec<String>>,
    statuses: Mutex<Vec<(GithubRepoName, CommitSha, CommitStatus)>>,
    commit_list_requests: AtomicUsize,
    fail_commit_listing: AtomicBool,
    fail_status_creation: AtomicBool,
}

impl Default for TestRepositoryClient {
    fn default() -> Self {
        let pr = default_pr();
        Self {
            prs: Mutex::new(HashMap::from([((default_repo().name, pr.number), pr)])),
            commits: Default::default(),
            statuses: Default::default(),
            commit_list_requests: Default::default(),
            fail_commit_listing: Default::default(),
            fail_status_creation: Default::default(),
        }
    }
}

impl TestRepositoryClient {
    // Setters
    pub fn add_pr(&self, repo: &GithubRepoName, pr: PullRequest) {
        self.prs.lock().unwrap().insert((repo.clone(), pr.number), pr);
    }

    pub fn remove_pr(&self, number: PullRequestNumber) {
        self.prs
            .lock()
            .unwrap()
            .retain(|(_, pr_number), _| *pr_number != number);
    }

    /// Sets the commit messages returned for any pull request.
    pub fn set_commits(&self, messages: &[&str]) {
        *self.commits.lock().unwrap() = messages.iter().map(|m| m.to_string()).collect();
    }

    pub fn fail_commit_listing(&self) {
        self.fail_commit_listing.store(true, Ordering::SeqCst);
    }

    pub fn fail_status_creation(&self) {
        self.fail_status_creation.store(true, Ordering::SeqCst);
    }

    // Getters
    pub fn statuses(&self) -> Vec<(CommitSha, CommitStatus)> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .map(|(_, sha, status)| (sha.clone(), status.clone()))
            .collect()
    }

    pub fn commit_list_requests(&self) -> usize {
        self.commit_list_requests.load(Ordering::SeqCst)
    }

    // Checks
    pub fn check_statuses(&self, expected: &[(&str, CommitStatus)]) {
        assert_eq!(
            self.statuses(),
            expected
                .iter()
                .map(|(sha, status)| (CommitSha::from(*sha), status.clone()))
                .collect::<Vec<_>>()
        );
    }
}

#[async_trait]
impl RepositoryClient for TestRepositoryClient {
    async fn get_pull_request(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<PullRequest> {
        self.prs
            .lock()
            .unwrap()
            .get(&(repo.clone(), pr))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PR {repo}#{pr} not found"))
    }

    async fn get_pull_request_commits(
        &self,
        _repo: &GithubRepoName,
        _pr: PullRequestNumber,
    ) -> anyhow::Result<Vec<Commit>> {
        self.commit_list_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_commit_listing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Cannot list commits"));
        }
        Ok(self
            .commits
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(index, message)| Commit {
                sha: CommitSha(format!("sha-{index}")),
                message: message.clone(),
            })
            .collect())
    }

    async fn create_status(
        &self,
        repo: &GithubRepoName,
        sha: &CommitSha,
        status: &CommitStatus,
    ) -> anyhow::Result<()> {
        if self.fail_status_creation.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Status creation rejected"));
        }
        self.statuses
            .lock()
            .unwrap()
            .push((repo.clone(), sha.clone(), status.clone()));
        Ok(())
    }
}
